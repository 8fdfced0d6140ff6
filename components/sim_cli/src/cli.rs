//! Command-line argument definitions

use clap::Parser;

/// Command-line arguments for the cadence-sim binary
#[derive(Debug, Parser)]
#[command(
    name = "cadence-sim",
    version,
    about = "Deterministic scheduling model demos"
)]
pub struct Cli {
    /// Demo scenario to run (see --list)
    #[arg(long)]
    pub demo: Option<String>,

    /// Print the execution trace after the demo output
    #[arg(long)]
    pub trace: bool,

    /// Emit the full report as JSON
    #[arg(long)]
    pub json: bool,

    /// List available demo scenarios
    #[arg(long)]
    pub list: bool,
}
