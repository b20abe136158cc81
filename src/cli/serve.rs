//! Serve command implementation.
//!
//! The bus is line-oriented JSON: every stdin line is one inbound message
//! `{"topic": ..., "payload": ...}` and every publication is written to
//! stdout in the same shape. A registration payload is itself a JSON
//! string, e.g.
//!
//! ```text
//! {"topic":"new_game","payload":"{\"lobby_name\":\"L\",\"team_name\":\"A\",\"player_name\":\"P1\"}"}
//! {"topic":"games/L/start","payload":"START"}
//! {"topic":"games/L/P1/move","payload":"UP"}
//! ```

use std::io::{self, BufRead};
use std::path::Path;
use std::thread;

use anyhow::{anyhow, Context};
use gridcoin::transport::{decode, publish_all, JsonLinesPublisher, Publication};
use gridcoin::{Dispatcher, ServerConfig};

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if the config is invalid, stdin or stdout fail, or a
/// worker thread panicked. Commands for a lobby whose worker has exited
/// are dropped with a warning.
pub(crate) fn execute(
    config: Option<&Path>,
    workers: Option<usize>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = match config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(workers) = workers {
        config.workers = workers;
    }
    if let Some(seed) = seed {
        config.level.seed = Some(seed);
    }
    config.validate()?;

    let dispatcher = Dispatcher::spawn(config.level, config.workers)?;
    let outbound = dispatcher.outbound();

    // Publications are written from their own thread so a slow stdout never
    // stalls the lobby workers.
    let writer = thread::Builder::new()
        .name("publisher".to_string())
        .spawn(move || {
            let stdout = io::stdout();
            let mut publisher = JsonLinesPublisher::new(stdout.lock());
            let mut published = 0;
            for out in &outbound {
                published += publish_all(&mut publisher, [&out])?;
            }
            Ok::<usize, gridcoin::transport::PublishError>(published)
        })
        .context("failed to spawn publisher thread")?;

    tracing::info!(
        workers = config.workers,
        width = config.level.width,
        height = config.level.height,
        "serving on stdin/stdout"
    );

    let mut dropped = 0_usize;
    for (index, line) in io::stdin().lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let message: Publication = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "dropping malformed bus line");
                continue;
            }
        };

        match decode(&message.topic, message.payload.as_bytes()) {
            Ok(command) => {
                if !dispatcher.offer(command) {
                    dropped += 1;
                }
            }
            Err(e) => tracing::warn!(topic = %message.topic, error = %e, "dropping message"),
        }
    }

    dispatcher.shutdown()?;
    let published = writer
        .join()
        .map_err(|_| anyhow!("publisher thread panicked"))??;
    tracing::info!(published, dropped, "input closed, server stopped");

    Ok(())
}
