//! Command-line interface for craftline
//!
//! # Commands
//!
//! - `validate` - Load every part of the project and report what fails
//! - `catalog list` - List declared artifacts and their types
//! - `catalog resolve <name> [--arg key=value]...` - Print a bound declaration as JSON
//! - `pipeline list` - List pipeline definitions
//! - `pipeline show <name> [--format dot]` - Print execution order and dependencies
//! - `run <pipeline> [--parameters <set>] [--arg key=value]...` - Run a pipeline definition
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging
//! - `--quiet` / `-q` - No logging
//! - neither - Info logging
//! - `--manifest-path <PATH>` - Use this `craftline.toml` instead of searching for one
//!
//! `RUST_LOG` takes priority over both logging flags when set.
//!
//! # Arguments
//!
//! `--arg` values are parsed as JSON when possible (`--arg n=5`,
//! `--arg tags='["a","b"]'`) and kept as strings otherwise. A dotted key
//! (`--arg train.rate=0.1`) becomes a parameter namespaced to that craft.
//!
//! # Embedding
//!
//! The stock binary registers no crafts. Applications pass their own
//! registry:
//!
//! ```rust,no_run
//! use craftline::craft::{Craft, CraftOutputs, CraftRegistry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = CraftRegistry::new()
//!         .with(Craft::builder("hello").produces_volatile("greeting").build(|_| {
//!             Ok(CraftOutputs::new().with("greeting", "hi"))
//!         })?);
//!     craftline::cli::run_with_registry(&registry)
//! }
//! ```

mod catalog;
pub mod common;
pub mod pipeline;
mod run;
pub mod validate;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::craft::CraftRegistry;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive, `None` disables logging
    pub log_level: Option<String>,
    /// Explicit manifest path
    pub manifest_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber. Logs go to stderr.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser)]
#[command(
    name = "craftline",
    about = "Declarative data pipelines over an artifact catalog",
    version,
    long_about = "craftline validates craftline projects, inspects their artifact catalog and runs pipeline definitions."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to craftline.toml
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the project configuration
    Validate(validate::ValidateCommand),

    /// Inspect the artifact catalog
    #[command(subcommand)]
    Catalog(catalog::CatalogCommand),

    /// Inspect pipeline definitions
    #[command(subcommand)]
    Pipeline(pipeline::PipelineCommand),

    /// Run a pipeline definition
    Run(run::RunCommand),
}

impl Cli {
    /// Execute the parsed command with no crafts registered.
    pub fn execute(self) -> Result<()> {
        self.execute_with_registry(&CraftRegistry::new())
    }

    pub fn execute_with_registry(self, registry: &CraftRegistry) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config, registry)
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            manifest_path: self.manifest_path.clone(),
        }
    }

    pub fn execute_with_config(self, config: CliConfig, registry: &CraftRegistry) -> Result<()> {
        match self.command {
            Commands::Validate(cmd) => cmd.execute(config.manifest_path, registry),
            Commands::Catalog(cmd) => cmd.execute(config.manifest_path),
            Commands::Pipeline(cmd) => cmd.execute(config.manifest_path, registry),
            Commands::Run(cmd) => cmd.execute(config.manifest_path, registry),
        }
    }
}

/// Parse the process arguments and run the CLI with `registry`'s crafts.
pub fn run_with_registry(registry: &CraftRegistry) -> Result<()> {
    Cli::parse().execute_with_registry(registry)
}
