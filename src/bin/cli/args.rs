//! CLI Argument Structures

use clap::{Args, Parser, Subcommand, ValueEnum};
use modwalk_rs::{ConcurrencyMode, ExportPolicy, GetPathsOptions};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Folder and module discovery
#[derive(Parser)]
#[command(name = "modwalk")]
#[command(version = VERSION)]
#[command(about = "Discover folders and module files, and load module exports")]
#[command(long_about = "
Walk a directory tree for folders or module files, and load modules through
their exports. Traversal is concurrent unless --sequential is given.

Common Usage:

  # Immediate subfolders of ./plugins
  modwalk folders ./plugins

  # Every module file in the tree, as JSON
  modwalk modules --recursive --format json ./plugins

  # Load all named exports of every data module
  modwalk load --recursive --export-policy named --export-name '*' ./plugins

  # Show and check configuration
  modwalk print-default-config
  modwalk validate-config modwalk.yml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "MODWALK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List folders under a directory
    Folders(WalkArgs),

    /// List module files under a directory
    Modules(WalkArgs),

    /// Load module files under a directory and print their exports
    Load(LoadArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a modwalk configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Where and how to walk
#[derive(Args)]
pub struct TraversalArgs {
    /// Root directory
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Visit subdirectories (and load modules) one at a time
    #[arg(long)]
    pub sequential: bool,
}

impl TraversalArgs {
    /// Command-line flags layered over the configured path options.
    pub fn path_options(&self, configured: &GetPathsOptions) -> GetPathsOptions {
        let mut options = configured.clone();
        if self.recursive {
            options.recursive = true;
        }
        options.concurrency = self.concurrency(configured.concurrency);
        options
    }

    /// The configured mode, forced to sequential by `--sequential`.
    pub fn concurrency(&self, configured: ConcurrencyMode) -> ConcurrencyMode {
        ConcurrencyMode::from_flag(configured.is_concurrent() && !self.sequential)
    }
}

#[derive(Args)]
pub struct WalkArgs {
    #[command(flatten)]
    pub traversal: TraversalArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub traversal: TraversalArgs,

    /// Which exports to deliver: default, named or all
    #[arg(long)]
    pub export_policy: Option<ExportPolicy>,

    /// Export name for the named policy ('*' for every named export)
    #[arg(long)]
    pub export_name: Option<String>,

    /// Report module locations without importing them
    #[arg(long)]
    pub no_import: bool,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    #[arg(value_name = "FILE")]
    pub config: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One path per line
    Text,
    /// JSON array
    Json,
}
