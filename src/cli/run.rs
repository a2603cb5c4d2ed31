//! Run a pipeline definition.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::common::{load_session, parse_assignments};
use super::validate::OutputFormat;
use crate::core::{Params, recursive_merge};
use crate::craft::CraftRegistry;
use crate::pipeline::LoggingHook;

#[derive(Args)]
pub struct RunCommand {
    /// Pipeline definition name
    pub pipeline: String,

    /// Parameter set used as the base call arguments
    #[arg(long, short = 'p')]
    pub parameters: Option<String>,

    /// Call argument as key=value, repeatable. Wins over the parameter set.
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub args: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl RunCommand {
    pub fn execute(self, manifest_path: Option<PathBuf>, registry: &CraftRegistry) -> Result<()> {
        let session = load_session(manifest_path)?;

        let mut args = match &self.parameters {
            Some(name) => session.parameters(name)?,
            None => Params::new(),
        };
        recursive_merge(&mut args, &parse_assignments(&self.args)?);
        debug!("call arguments: {}", serde_json::Value::Object(args.clone()));

        let pipeline = session.pipeline(&self.pipeline, registry)?.with_hook(Arc::new(LoggingHook));
        let outcome = pipeline.run(session.catalog(), &args)?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
            OutputFormat::Text => {
                println!(
                    "{} Pipeline '{}' completed ({} crafts)",
                    "✓".green(),
                    self.pipeline,
                    pipeline.len()
                );
                for artifact in &outcome.artifacts {
                    println!("  wrote {}", artifact.bold());
                }
                if !outcome.volatiles.is_empty() {
                    let names: Vec<&str> = outcome.volatiles.keys().map(String::as_str).collect();
                    println!("  volatiles: {}", names.join(", "));
                }
            }
        }
        Ok(())
    }
}
