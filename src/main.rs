//! Gridcoin CLI - run the game server or simulate games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Gridcoin - a round-based team coin collection game server
#[derive(Parser, Debug)]
#[command(name = "gridcoin")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve lobbies: read bus messages from stdin, write publications to stdout
    Serve {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Lobby worker threads (overrides config)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Level seed (overrides config; default: random per lobby)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run self-play games with built-in bots and aggregate statistics
    Simulate {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Teams per game
        #[arg(long, default_value = "2")]
        teams: u8,

        /// Players per team
        #[arg(long, default_value = "2")]
        players_per_team: u8,

        /// Teams playing greedy; the rest play random
        #[arg(long, default_value = "1")]
        greedy_teams: u8,

        /// Round cap per game
        #[arg(short = 'r', long, default_value = "200")]
        max_rounds: u32,

        /// TOML config file for the level
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Serve {
            config,
            workers,
            seed,
        } => cli::serve::execute(config.as_deref(), workers, seed),

        Commands::Simulate {
            games,
            seed,
            teams,
            players_per_team,
            greedy_teams,
            max_rounds,
            config,
            format,
            threads,
            progress,
        } => cli::simulate::execute(&cli::simulate::SimulateArgs {
            games,
            seed,
            teams,
            players_per_team,
            greedy_teams,
            max_rounds,
            config,
            format,
            threads,
            progress,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
