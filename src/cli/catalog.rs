//! Catalog inspection commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use super::common::{load_session, parse_assignments};

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List declared artifacts and their types
    List(ListCommand),

    /// Print an artifact declaration with its placeholders bound
    Resolve(ResolveCommand),
}

#[derive(Args)]
pub struct ListCommand {
    /// Print names only
    #[arg(long)]
    pub names_only: bool,
}

#[derive(Args)]
pub struct ResolveCommand {
    /// Artifact name
    pub name: String,

    /// Call argument as key=value, repeatable
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub args: Vec<String>,
}

impl CatalogCommand {
    pub fn execute(self, manifest_path: Option<PathBuf>) -> Result<()> {
        match self {
            Self::List(cmd) => cmd.execute(manifest_path),
            Self::Resolve(cmd) => cmd.execute(manifest_path),
        }
    }
}

impl ListCommand {
    fn execute(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let session = load_session(manifest_path)?;
        let catalog = session.catalog();

        if catalog.names().next().is_none() {
            println!("No artifacts declared.");
            return Ok(());
        }
        let width = catalog.names().map(str::len).max().unwrap_or(0);
        for declaration in catalog.declarations() {
            if self.names_only {
                println!("{}", declaration.name);
            } else {
                let name = format!("{:width$}", declaration.name);
                println!("{}  {}", name.bold(), declaration.artifact_type.cyan());
            }
        }
        Ok(())
    }
}

impl ResolveCommand {
    fn execute(self, manifest_path: Option<PathBuf>) -> Result<()> {
        let session = load_session(manifest_path)?;
        let args = parse_assignments(&self.args)?;
        let resolved = session.catalog().resolve(&self.name, &args)?;
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        Ok(())
    }
}
