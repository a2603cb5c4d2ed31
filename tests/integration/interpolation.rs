use craftline::core::CraftlineError;
use serde_json::json;

use crate::common::{TestProject, params};

fn project_with(catalog: &str) -> TestProject {
    let project = TestProject::new("interp").unwrap();
    project
        .configuration(
            "globals.yaml",
            "db:\n  host: prod.example\n  port: 5432\nqueries:\n  by_region:\n    north: SELECT 1\n    south: SELECT 2\nalias: by_region\n",
        )
        .unwrap();
    project.configuration("locals_dev.yaml", "db:\n  host: localhost\n").unwrap();
    project.catalog("catalog.yaml", catalog).unwrap();
    project
}

#[test]
fn test_locals_override_globals_at_load_time() {
    let project = project_with("conn:\n  type: text\n  path: \"{{ db.host }}:{{ db.port }}\"\n");
    let session = project.session().unwrap();
    let declaration = session.catalog().declaration("conn").unwrap();
    assert_eq!(declaration.extra["path"], json!("localhost:5432"));
}

#[test]
fn test_whole_field_placeholder_keeps_type() {
    let project = project_with("conn:\n  type: text\n  path: p\n  port: \"{{ db.port }}\"\n");
    let session = project.session().unwrap();
    let resolved = session.catalog().resolve("conn", &params(json!({}))).unwrap();
    assert_eq!(resolved.extra["port"], json!(5432));
}

#[test]
fn test_dynamic_binding_and_missing_argument() {
    let project = project_with("part:\n  type: json\n  path: \"out/!{ region }/!{ day }.json\"\n");
    let session = project.session().unwrap();
    let catalog = session.catalog();

    let resolved = catalog.resolve("part", &params(json!({"region": "north", "day": 3}))).unwrap();
    assert_eq!(resolved.path(), Some("out/north/3.json"));

    match catalog.resolve("part", &params(json!({"region": "north"}))).unwrap_err() {
        CraftlineError::UnresolvedDynamic { name, artifact } => {
            assert_eq!(name, "day");
            assert_eq!(artifact, "part");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nullable_field_becomes_null() {
    let project = project_with("part:\n  type: json\n  path: fixed.json\n  filter: \"!{ filter }\"\n  nullable: [filter]\n");
    let session = project.session().unwrap();
    let resolved = session.catalog().resolve("part", &params(json!({}))).unwrap();
    assert_eq!(resolved.extra["filter"], json!(null));
}

#[test]
fn test_explicit_null_argument_is_present() {
    let project = project_with("part:\n  type: json\n  path: \"v_!{ version }.json\"\n");
    let session = project.session().unwrap();
    let resolved = session.catalog().resolve("part", &params(json!({"version": null}))).unwrap();
    assert_eq!(resolved.path(), Some("v_None.json"));
}

#[test]
fn test_expressions_only_in_flagged_fields() {
    let project = project_with(
        "query:\n  type: text\n  path: q.sql\n  sql: \"+{ queries.by_region['!{ region }'] }+\"\n  note: \"+{ queries.by_region['!{ region }'] }+\"\n  expressions: [sql]\n",
    );
    let session = project.session().unwrap();
    let resolved = session.catalog().resolve("query", &params(json!({"region": "south"}))).unwrap();
    assert_eq!(resolved.extra["sql"], json!("SELECT 2"));
    assert_eq!(resolved.extra["note"], json!("+{ queries.by_region['!{ region }'] }+"));
}

#[test]
fn test_expression_head_from_static_indirection() {
    let project = project_with(
        "query:\n  type: text\n  path: q.sql\n  sql: \"+{ queries.{{ alias }}['north'] }+\"\n  expressions: [sql]\n",
    );
    let session = project.session().unwrap();
    let resolved = session.catalog().resolve("query", &params(json!({}))).unwrap();
    assert_eq!(resolved.extra["sql"], json!("SELECT 1"));
}

#[test]
fn test_dynamic_args_shadow_static_head() {
    let project = project_with(
        "query:\n  type: text\n  path: q.sql\n  sql: \"+{ alias }+\"\n  expressions: [sql]\n",
    );
    let session = project.session().unwrap();
    let catalog = session.catalog();
    assert_eq!(catalog.resolve("query", &params(json!({}))).unwrap().extra["sql"], json!("by_region"));
    assert_eq!(
        catalog.resolve("query", &params(json!({"alias": "mine"}))).unwrap().extra["sql"],
        json!("mine")
    );
}

#[test]
fn test_malformed_placeholder_fails_load() {
    let project = project_with("broken:\n  type: text\n  path: \"{{ db.host\"\n");
    let err = project.session().unwrap_err();
    let root = err.root_cause().downcast_ref::<CraftlineError>();
    assert!(matches!(root, Some(CraftlineError::Syntax { .. })), "got: {err:#}");
}
