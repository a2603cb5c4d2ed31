use craftline::catalog::{Adapter, AdapterRequest, InMemoryBackend};
use craftline::core::CraftlineError;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::common::{TestProject, params};

fn project(catalog: &str) -> TestProject {
    let project = TestProject::new("store").unwrap();
    project.catalog("catalog.yaml", catalog).unwrap();
    project
}

#[test]
fn test_builtin_adapters_round_trip_on_disk() {
    let project = project(
        "as_json:\n  type: json\n  path: nested/a.json\n\
         as_yaml:\n  type: yaml\n  path: b.yaml\n\
         as_toml:\n  type: toml\n  path: c.toml\n\
         as_text:\n  type: text\n  path: d.txt\n",
    );
    let session = project.session().unwrap();
    let catalog = session.catalog();
    let none = params(json!({}));

    let table = json!({"name": "north", "values": [1, 2, 3]});
    for name in ["as_json", "as_yaml", "as_toml"] {
        catalog.save(name, &table, &none).unwrap();
        assert_eq!(catalog.load(name, &none).unwrap(), table, "adapter for {name}");
    }
    catalog.save("as_text", &json!("hello\n"), &none).unwrap();
    assert_eq!(catalog.load("as_text", &none).unwrap(), json!("hello\n"));

    assert!(project.data_dir().join("nested/a.json").is_file());
    assert_eq!(project.read_data("d.txt").unwrap(), "hello\n");
}

#[test]
fn test_text_adapter_rejects_non_strings() {
    let project = project("t:\n  type: text\n  path: t.txt\n");
    let session = project.session().unwrap();
    let err = session.catalog().save("t", &json!({"a": 1}), &params(json!({}))).unwrap_err();
    assert!(matches!(err, CraftlineError::Adapter { .. }));
}

#[test]
fn test_memory_backend_and_unknown_scheme() {
    let project = project("m:\n  type: json\n  path: \"memory://runs/!{ run }\"\ns3:\n  type: json\n  path: \"s3://bucket/key\"\n");
    let session = project.session().unwrap();
    let catalog = session.catalog();
    let args = params(json!({"run": 7}));

    catalog.save("m", &json!([1]), &args).unwrap();
    assert_eq!(catalog.load("m", &args).unwrap(), json!([1]));
    assert!(!project.data_dir().join("runs").exists());

    let err = catalog.load("s3", &args).unwrap_err();
    match err {
        CraftlineError::Adapter { source, .. } => {
            assert!(format!("{source:#}").contains("s3"), "got: {source:#}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_artifact_suggests_closest() {
    let project = project("orders:\n  type: json\n  path: o.json\n");
    let session = project.session().unwrap();
    match session.catalog().resolve("order", &params(json!({}))).unwrap_err() {
        CraftlineError::UnknownArtifact { name, suggestion } => {
            assert_eq!(name, "order");
            assert_eq!(suggestion.as_deref(), Some("orders"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

struct Upper;

impl Adapter for Upper {
    fn load(&self, request: &AdapterRequest<'_>) -> anyhow::Result<Value> {
        Ok(json!(request.path()?.to_uppercase()))
    }

    fn save(&self, _request: &AdapterRequest<'_>, _payload: &Value) -> anyhow::Result<()> {
        anyhow::bail!("read only")
    }
}

#[test]
fn test_custom_adapter_and_backend_registration() {
    let project = project("shout:\n  type: upper\n  path: \"!{ word }\"\nmissing:\n  type: parquet\n  path: x\n");
    let mut session = project.session().unwrap();
    session.catalog_mut().register_adapter("upper", Arc::new(Upper));
    session.catalog_mut().register_backend("scratch", Arc::new(InMemoryBackend::new()));

    let catalog = session.catalog();
    let args = params(json!({"word": "quiet"}));
    assert_eq!(catalog.load("shout", &args).unwrap(), json!("QUIET"));
    assert!(catalog.save("shout", &json!(1), &args).is_err());
    assert!(matches!(
        catalog.load("missing", &args).unwrap_err(),
        CraftlineError::UnknownAdapter { .. }
    ));
    assert!(catalog.backends().schemes().contains(&"scratch"));
}
