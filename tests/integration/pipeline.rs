use craftline::catalog::{Adapter, AdapterRequest};
use craftline::core::CraftlineError;
use craftline::craft::{Craft, CraftOutputs};
use craftline::pipeline::{Pipeline, RunHook, combine};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::common::{TestProject, params, sales_project, sales_registry};

#[test]
fn test_composed_pipeline_runs_against_project_storage() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let registry = sales_registry();

    let pipeline = combine(
        &Pipeline::from_craft(registry.get("report").unwrap()),
        &combine(
            &Pipeline::from_craft(registry.get("summarize").unwrap()),
            &Pipeline::from_craft(registry.get("clean").unwrap()),
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(pipeline.order(), vec!["clean", "summarize", "report"]);

    let args = params(json!({"region": "north", "clean": {"minimum": 10}}));
    let outcome = pipeline.run(session.catalog(), &args).unwrap();

    assert_eq!(outcome.artifacts, vec!["cleaned", "report"]);
    assert_eq!(outcome.volatiles["total"], json!(42));
    assert_eq!(project.read_data("out_local/cleaned_n01.json").unwrap().trim(), "[\n  12,\n  30\n]");
    assert_eq!(project.read_data("out_local/report.txt").unwrap(), "north: 42");
}

#[test]
fn test_volatiles_do_not_leak_between_runs() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let registry = sales_registry();
    let summarize = Pipeline::from_crafts(
        "sum",
        [registry.get("clean").unwrap(), registry.get("summarize").unwrap()],
    )
    .unwrap();
    let report_only = Pipeline::from_craft(registry.get("report").unwrap());

    let args = params(json!({"region": "south"}));
    assert_eq!(summarize.run(session.catalog(), &args).unwrap().volatiles["total"], json!(48));

    match report_only.run(session.catalog(), &args).unwrap_err() {
        CraftlineError::UnresolvedVolatile { craft, name } => {
            assert_eq!((craft.as_str(), name.as_str()), ("report", "total"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_external_artifact_requirement_reads_catalog() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let registry = sales_registry();
    let pipeline = Pipeline::from_craft(registry.get("summarize").unwrap());

    project.data("out_local/cleaned_s02.json", "[1, 2, 3]").unwrap();
    let outcome = pipeline.run(session.catalog(), &params(json!({"region": "south"}))).unwrap();
    assert_eq!(outcome.volatiles["total"], json!(6));
    assert!(pipeline.graph().unwrap().external_inputs().contains("cleaned"));
}

#[test]
fn test_missing_input_uses_declared_default() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let tolerant = Craft::builder("tolerant")
        .artifact_with_default("orders", json!([]))
        .produces_volatile("count")
        .build(|inputs| {
            let orders: Vec<i64> = inputs.get_as("orders")?;
            Ok(CraftOutputs::new().with("count", orders.len()))
        })
        .unwrap();

    let outcome = tolerant.call(session.catalog(), &params(json!({"region": "west"}))).unwrap();
    assert_eq!(outcome.volatiles["count"], json!(0));
}

#[derive(Default)]
struct Trace(Mutex<Vec<String>>);

impl RunHook for Trace {
    fn pre_run(&self, target: &str, _context: &craftline::pipeline::ExecutionContext) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(format!("pre {target}"));
        Ok(())
    }

    fn post_run(&self, target: &str, _context: &craftline::pipeline::ExecutionContext) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(format!("post {target}"));
        Ok(())
    }

    fn on_error(&self, target: &str, _error: &CraftlineError) {
        self.0.lock().unwrap().push(format!("error {target}"));
    }
}

#[test]
fn test_pipeline_hooks_wrap_the_run() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let registry = sales_registry();
    let trace = Arc::new(Trace::default());

    let pipeline = Pipeline::from_crafts(
        "north",
        [registry.get("clean").unwrap(), registry.get("summarize").unwrap()],
    )
    .unwrap()
    .with_hook(trace.clone());

    pipeline.run(session.catalog(), &params(json!({"region": "north"}))).unwrap();
    assert_eq!(*trace.0.lock().unwrap(), vec!["pre north", "post north"]);

    // No raw orders for this region
    assert!(pipeline.run(session.catalog(), &params(json!({"region": "west"}))).is_err());
    assert_eq!(trace.0.lock().unwrap().last().map(String::as_str), Some("error north"));
}

/// Keeps artifacts in memory and counts saves.
#[derive(Default)]
struct Counting {
    saves: AtomicUsize,
    stored: Mutex<HashMap<String, Value>>,
}

impl Adapter for Counting {
    fn load(&self, request: &AdapterRequest<'_>) -> anyhow::Result<Value> {
        let path = request.path()?;
        self.stored
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("nothing saved at {path}"))
    }

    fn save(&self, request: &AdapterRequest<'_>, payload: &Value) -> anyhow::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.stored.lock().unwrap().insert(request.path()?.to_string(), payload.clone());
        Ok(())
    }
}

#[test]
fn test_build_then_train_saves_data_once_per_run() {
    let project = TestProject::new("training").unwrap();
    project.catalog("catalog.yaml", "data:\n  type: counted\n  path: \"data_!{ n }\"\n").unwrap();
    let mut session = project.session().unwrap();
    let counting = Arc::new(Counting::default());
    session.catalog_mut().register_adapter("counted", counting.clone());

    let build = Craft::builder("build")
        .param_with_default("n", 500)
        .produces_artifact("data")
        .build(|inputs| {
            let n: u64 = inputs.get_as("n")?;
            Ok(CraftOutputs::new().with("data", json!((0..n).collect::<Vec<_>>())))
        })
        .unwrap();
    let train = Craft::builder("train")
        .artifact("data")
        .produces_volatile("model")
        .build(|inputs| {
            let rows = inputs.artifact("data")?.as_array().map_or(0, Vec::len);
            Ok(CraftOutputs::new().with("model", rows))
        })
        .unwrap();

    let pipeline = combine(&Pipeline::from_craft(train), &Pipeline::from_craft(build)).unwrap();
    assert_eq!(pipeline.order(), vec!["build", "train"]);

    let outcome = pipeline.run(session.catalog(), &params(json!({"n": 10}))).unwrap();
    assert_eq!(outcome.volatiles["model"], json!(10));
    assert_eq!(outcome.artifacts, vec!["data"]);
    assert_eq!(counting.saves.load(Ordering::SeqCst), 1);

    let outcome = pipeline.run(session.catalog(), &params(json!({"n": 20}))).unwrap();
    assert_eq!(outcome.volatiles["model"], json!(20));
    assert_eq!(counting.saves.load(Ordering::SeqCst), 2);
    assert_eq!(counting.stored.lock().unwrap().len(), 2);
}

#[test]
fn test_reporting_pipeline_renders_as_dot() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let dot = session.pipeline("reporting", &sales_registry()).unwrap().to_dot().unwrap();
    assert!(dot.starts_with("digraph"));
    for label in ["\"clean\"", "\"summarize\"", "\"report\"", "\"cleaned\"", "\"total\""] {
        assert!(dot.contains(label), "missing {label} in {dot}");
    }
}
