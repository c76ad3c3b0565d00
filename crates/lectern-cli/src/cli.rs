//! CLI command definitions and argument parsing.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lectern - AI-assisted literature review over a Zotero library.
#[derive(Debug, Parser)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "LECTERN_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze papers and file the results
    Analyze(AnalyzeArgs),

    /// Ask follow-up questions about one paper
    Chat(ChatArgs),

    /// Poll the library and analyze newly added papers
    Watch(WatchArgs),

    /// File an analysis produced elsewhere (read from stdin)
    Save(SaveArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub target: AnalyzeTarget,

    /// Only show what would be analyzed
    #[arg(long)]
    pub dry_run: bool,

    /// Model to use (e.g. gpt-4o, claude-sonnet-4-6)
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Which items to analyze.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct AnalyzeTarget {
    /// Zotero item key
    #[arg(short, long)]
    pub key: Option<String>,

    /// The N most recently added items
    #[arg(short, long, value_name = "N")]
    pub recent: Option<usize>,

    /// Every item not analyzed yet
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the chat command.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).multiple(true).args(["key", "md"])))]
pub struct ChatArgs {
    /// Zotero item key
    #[arg(short, long)]
    pub key: Option<String>,

    /// Existing analysis note
    #[arg(long)]
    pub md: Option<PathBuf>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Do not load the PDF text
    #[arg(long)]
    pub no_pdf: bool,
}

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Process new items once and exit
    #[arg(long)]
    pub once: bool,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the save command.
#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Zotero item key
    pub key: String,
}

/// Arguments for configuration management.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration with secrets masked
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
