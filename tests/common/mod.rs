//! Common test utilities for craftline integration tests

// Not every suite uses every helper
#![allow(dead_code)]

use anyhow::Result;
use craftline::core::Params;
use craftline::craft::{Craft, CraftOutputs, CraftRegistry};
use serde_json::{Value, json};

pub use craftline::test_utils::{TestProject, init_test_logging};

/// Captured result of a `craftline` invocation.
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run the `craftline` binary against `project`'s manifest.
pub fn run_craftline(project: &TestProject, args: &[&str]) -> Result<CommandOutput> {
    let output = assert_cmd::Command::cargo_bin("craftline")?
        .arg("--manifest-path")
        .arg(project.manifest_path())
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .current_dir(project.root())
        .output()?;
    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

pub fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a mapping, got {other}"),
    }
}

/// A small sales project: per-region raw orders, a cleaned table and a total.
pub fn sales_project() -> Result<TestProject> {
    let project = TestProject::new("sales")?;
    project.configuration(
        "globals.yaml",
        "storage:\n  raw: raw\n  out: out\nregions:\n  north: n01\n  south: s02\n",
    )?;
    project.configuration("locals.yaml", "storage:\n  out: out_local\n")?;
    project.catalog(
        "sales.yaml",
        r#"orders:
  type: json
  path: "{{ storage.raw }}/!{ region }.json"
cleaned:
  type: json
  path: "{{ storage.out }}/cleaned_+{ regions['!{ region }'] }+.json"
  expressions: [path]
report:
  type: text
  path: "{{ storage.out }}/report.txt"
"#,
    )?;
    project.parameters(
        "params.yaml",
        "default:\n  region: north\n  clean:\n    minimum: 10\nsouth:\n  from: [default]\n  region: south\n",
    )?;
    project.pipelines(
        "pipelines.yaml",
        "prepare:\n  operators: [clean]\nreporting:\n  operators: [report, prepare, summarize]\n",
    )?;
    project.data("raw/north.json", "[5, 12, 30]")?;
    project.data("raw/south.json", "[8, 40]")?;
    Ok(project)
}

/// Crafts operating on [`sales_project`]'s catalog.
pub fn sales_registry() -> CraftRegistry {
    CraftRegistry::new()
        .with(
            Craft::builder("clean")
                .artifact("orders")
                .param_with_default("minimum", 0)
                .produces_artifact("cleaned")
                .build(|inputs| {
                    let orders: Vec<i64> = inputs.get_as("orders")?;
                    let minimum: i64 = inputs.get_as("minimum")?;
                    let kept: Vec<i64> = orders.into_iter().filter(|o| *o >= minimum).collect();
                    Ok(CraftOutputs::new().with("cleaned", json!(kept)))
                })
                .unwrap(),
        )
        .with(
            Craft::builder("summarize")
                .artifact("cleaned")
                .produces_volatile("total")
                .build(|inputs| {
                    let cleaned: Vec<i64> = inputs.get_as("cleaned")?;
                    Ok(CraftOutputs::new().with("total", cleaned.iter().sum::<i64>()))
                })
                .unwrap(),
        )
        .with(
            Craft::builder("report")
                .volatile("total")
                .param("region")
                .produces_artifact("report")
                .build(|inputs| {
                    let total: i64 = inputs.get_as("total")?;
                    let region: String = inputs.get_as("region")?;
                    Ok(CraftOutputs::new().with("report", format!("{region}: {total}")))
                })
                .unwrap(),
        )
}
