//! CLI command implementations for Gridcoin.

pub(crate) mod serve;
pub(crate) mod simulate;

mod output;

use clap::ValueEnum;

/// Output format for the `simulate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}
