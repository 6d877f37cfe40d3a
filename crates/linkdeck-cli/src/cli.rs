use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "linkdeck",
    about = "linkdeck: replay and inspect application state mutations",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with [store] and [display] sections
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply a JSON mutation script to a fresh store and print the result
    Replay(ReplayArgs),
    /// Format link timestamps for display
    FormatDate(FormatDateArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Path to a JSON array of mutations, or `-` for stdin
    pub script: String,
    /// JSON array of links to hydrate the store with before replaying
    #[arg(long)]
    pub links: Option<PathBuf>,
    /// Print each commit as it is applied
    #[arg(long)]
    pub trace: bool,
}

#[derive(Args)]
pub struct FormatDateArgs {
    #[arg(required = true)]
    pub values: Vec<String>,
    /// Display offset such as +0200; defaults to each value's own offset
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<String>,
}
