use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tangles",
    about = "Tangles: structural revisions between post snapshots",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./tangles.toml when present)
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
    /// Generate the revision between two post snapshots
    Diff(DiffArgs),
    /// Print the text delta between two strings
    Delta(DeltaArgs),
    /// Decode a text delta into its edits
    Explain(ExplainArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// JSON file holding the earlier snapshot
    pub before: PathBuf,
    /// JSON file holding the later snapshot
    pub after: PathBuf,
    /// Mark the revision as publicly visible
    #[arg(long)]
    pub public: bool,
    /// Reason recorded with the revision
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Args)]
pub struct DeltaArgs {
    pub old: String,
    pub new: String,
}

#[derive(Args)]
pub struct ExplainArgs {
    pub delta: String,
}
