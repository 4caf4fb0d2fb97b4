//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Covenant CLI - Extract contract data from uploaded documents.
#[derive(Debug, Parser)]
#[command(name = "covenant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COVENANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract contract fields from a document
    Extract(ExtractArgs),

    /// Show the entities recognized in a document
    Entities(EntitiesArgs),

    /// List documents in the store
    List(StoreArgs),

    /// Describe the recognition engine
    Recognizer,

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Document store selection.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StoreArgs {
    /// Directory of uploaded documents (overrides settings.store_dir)
    #[arg(short, long, env = "COVENANT_STORE")]
    pub store: Option<PathBuf>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document ID (file name in the store)
    pub document: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Time budget in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Drop candidates below this confidence (0.0-1.0)
    #[arg(short, long)]
    pub min_confidence: Option<f64>,

    /// Fields to extract, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Show every candidate, not just the top one
    #[arg(short, long)]
    pub all: bool,
}

/// Arguments for the entities command.
#[derive(Debug, Parser)]
pub struct EntitiesArgs {
    /// Document ID (file name in the store)
    pub document: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Start from a preset instead of the defaults
        #[arg(long, value_enum)]
        preset: Option<PresetArg>,
    },

    /// Print the configuration file path
    Path,
}

/// Extractor presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Short timeouts, strict resolution, confident candidates only
    Aggressive,
    /// Long timeouts, permissive resolution, every candidate kept
    Lenient,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<PresetArg> for covenant_extractor::ExtractorConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Aggressive => covenant_extractor::ExtractorConfig::aggressive(),
            PresetArg::Lenient => covenant_extractor::ExtractorConfig::lenient(),
        }
    }
}
