//! Simulate command implementation.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use gridcoin::simulation::{simulate_many, SimulationSpec};
use gridcoin::ServerConfig;
use indicatif::{ProgressBar, ProgressStyle};

use super::output::{format_simulation_text, JsonSimulationReport, SimulationStats};
use super::OutputFormat;

/// Arguments of the simulate command.
#[derive(Debug)]
pub(crate) struct SimulateArgs {
    pub(crate) games: u64,
    pub(crate) seed: Option<u64>,
    pub(crate) teams: u8,
    pub(crate) players_per_team: u8,
    pub(crate) greedy_teams: u8,
    pub(crate) max_rounds: u32,
    pub(crate) config: Option<PathBuf>,
    pub(crate) format: OutputFormat,
    pub(crate) threads: Option<usize>,
    pub(crate) progress: bool,
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the results cannot
/// be serialized. Individual failed games are counted, not fatal.
pub(crate) fn execute(args: &SimulateArgs) -> anyhow::Result<()> {
    let level = match &args.config {
        Some(path) => {
            ServerConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?
                .level
        }
        None => ServerConfig::default().level,
    };

    // Set thread pool size if specified
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = args.seed.unwrap_or_else(rand::random);

    let spec = SimulationSpec {
        teams: args.teams,
        players_per_team: args.players_per_team,
        max_rounds: args.max_rounds,
        greedy_teams: args.greedy_teams,
        level,
    };

    let pb = if args.progress {
        let pb = ProgressBar::new(args.games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .context("invalid progress template")?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    tracing::info!(games = args.games, base_seed, "simulation started");
    let start = Instant::now();
    let results = simulate_many(base_seed, args.games, &spec);
    let duration = start.elapsed();

    if let Some(pb) = pb {
        pb.set_position(args.games);
        pb.finish_with_message("done");
    }

    let mut stats = SimulationStats::new(&spec);
    for result in &results {
        match result {
            Ok(result) => stats.add_result(result),
            Err(e) => {
                tracing::warn!(error = %e, "simulated game failed");
                stats.add_failure();
            }
        }
    }

    match args.format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_simulation_text(&stats));
            println!();
            println!(
                "Base seed: {base_seed}\nDuration: {:.2}s ({:.0} games/sec)",
                duration.as_secs_f64(),
                stats.games_per_sec(duration)
            );
        }
        OutputFormat::Json => {
            let games: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            let report = JsonSimulationReport::new(base_seed, &stats, games);
            let json = serde_json::to_string_pretty(&report)
                .context("JSON serialization failed")?;
            println!("{json}");
        }
    }

    Ok(())
}
