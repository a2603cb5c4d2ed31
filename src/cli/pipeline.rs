//! Pipeline inspection commands.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::common::load_session;
use crate::craft::CraftRegistry;
use crate::pipeline::Pipeline;

#[derive(Subcommand)]
pub enum PipelineCommand {
    /// List pipeline definitions and their operators
    List,

    /// Show a pipeline's execution order and dependencies
    Show(ShowCommand),
}

#[derive(Args)]
pub struct ShowCommand {
    /// Pipeline definition name
    pub name: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: GraphFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    /// Graphviz DOT source
    Dot,
}

impl PipelineCommand {
    pub fn execute(self, manifest_path: Option<PathBuf>, registry: &CraftRegistry) -> Result<()> {
        match self {
            Self::List => list(manifest_path),
            Self::Show(cmd) => cmd.execute(manifest_path, registry),
        }
    }
}

fn list(manifest_path: Option<PathBuf>) -> Result<()> {
    let session = load_session(manifest_path)?;
    let definitions = session.pipeline_definitions();

    if definitions.is_empty() {
        println!("No pipelines defined.");
        return Ok(());
    }
    for name in definitions.names() {
        let operators = definitions.get(name).map(|d| d.operators.join(" + ")).unwrap_or_default();
        println!("{}  {}", name.bold(), operators);
    }
    Ok(())
}

impl ShowCommand {
    fn execute(self, manifest_path: Option<PathBuf>, registry: &CraftRegistry) -> Result<()> {
        let session = load_session(manifest_path)?;
        let pipeline = session.pipeline(&self.name, registry)?;
        print!("{}", render(&pipeline, self.format)?);
        Ok(())
    }
}

/// Render `pipeline` as text or DOT.
pub fn render(pipeline: &Pipeline, format: GraphFormat) -> Result<String> {
    if format == GraphFormat::Dot {
        return Ok(pipeline.to_dot()?);
    }

    let graph = pipeline.graph()?;
    let mut out = String::new();
    writeln!(out, "Pipeline '{}' ({} crafts)", pipeline.name(), pipeline.len())?;
    for (position, name) in pipeline.order().iter().enumerate() {
        writeln!(out, "  {}. {}", position + 1, name)?;
    }

    let edges = graph.edges();
    if !edges.is_empty() {
        writeln!(out, "Dependencies:")?;
        for (producer, consumer, name) in edges {
            writeln!(out, "  {producer} → {consumer} ({name})")?;
        }
    }
    if !graph.external_inputs().is_empty() {
        let inputs: Vec<&str> = graph.external_inputs().iter().map(String::as_str).collect();
        writeln!(out, "External inputs: {}", inputs.join(", "))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::craft::{Craft, CraftOutputs};
    use crate::test_utils::TestProject;

    fn registry() -> CraftRegistry {
        CraftRegistry::new()
            .with(
                Craft::builder("ingest")
                    .artifact("raw")
                    .produces_volatile("rows")
                    .build(|_| Ok(CraftOutputs::new().with("rows", 1)))
                    .unwrap(),
            )
            .with(
                Craft::builder("train")
                    .volatile("rows")
                    .produces_volatile("model")
                    .build(|_| Ok(CraftOutputs::new().with("model", 2)))
                    .unwrap(),
            )
    }

    fn pipeline() -> Pipeline {
        let project = TestProject::new("graph").unwrap();
        project.pipelines("p.yaml", "daily:\n  operators: [train, ingest]\n").unwrap();
        project.session().unwrap().pipeline("daily", &registry()).unwrap()
    }

    #[test]
    fn test_text_rendering() {
        let text = render(&pipeline(), GraphFormat::Text).unwrap();
        assert!(text.starts_with("Pipeline 'daily' (2 crafts)"));
        assert!(text.contains("  1. ingest\n  2. train\n"));
        assert!(text.contains("ingest → train (rows)"));
        assert!(text.contains("External inputs: raw"));
    }

    #[test]
    fn test_dot_rendering() {
        let dot = render(&pipeline(), GraphFormat::Dot).unwrap();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("\"rows\""));
    }
}
