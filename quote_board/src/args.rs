//! Command-line arguments for the quote dashboard.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the settings file. Defaults to `.moprc` in the home directory.
    #[clap(short, long)]
    pub profile: Option<String>,

    /// Append log records to this file. Logging is off without it, since the
    /// terminal itself is taken over by the dashboard.
    #[clap(long)]
    pub log_file: Option<String>,
}
