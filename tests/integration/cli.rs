use predicates::prelude::*;

use crate::common::{TestProject, run_craftline, sales_project};

#[test]
fn test_validate_valid_project() {
    let project = sales_project().unwrap();
    let output = run_craftline(&project, &["validate"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("✓ Manifest"));
    assert!(output.stdout.contains("Catalog (3 artifacts)"));
    // The stock binary has no crafts to build definitions with
    assert!(output.stdout.contains("⚠"));
}

#[test]
fn test_validate_reports_failures() {
    let project = TestProject::new("bad").unwrap();
    project.catalog("c.yaml", "x:\n  type: json\n  path: \"{{ nowhere }}\"\n").unwrap();

    let output = run_craftline(&project, &["validate"]).unwrap();
    assert!(!output.success);
    assert!(output.stdout.contains("✗ Catalog"));
    assert!(output.stdout.contains("nowhere"));
}

#[test]
fn test_validate_json_format() {
    let project = sales_project().unwrap();
    let output = run_craftline(&project, &["validate", "--format", "json"]).unwrap();
    assert!(output.success);
    let results: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(results["valid"], serde_json::json!(true));
    assert_eq!(results["artifacts"], serde_json::json!(3));
}

#[test]
fn test_catalog_list_is_sorted() {
    let project = sales_project().unwrap();
    let output = run_craftline(&project, &["catalog", "list", "--names-only"]).unwrap();
    assert!(output.success);
    assert_eq!(output.stdout.lines().collect::<Vec<_>>(), vec!["cleaned", "orders", "report"]);
}

#[test]
fn test_catalog_resolve_prints_json() {
    let project = sales_project().unwrap();
    let output =
        run_craftline(&project, &["catalog", "resolve", "cleaned", "--arg", "region=south"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);

    let resolved: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(resolved["type"], "json");
    assert_eq!(resolved["extra"]["path"], "out_local/cleaned_s02.json");
}

#[test]
fn test_catalog_resolve_missing_argument_fails() {
    let project = sales_project().unwrap();
    let output = run_craftline(&project, &["catalog", "resolve", "orders"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("region"));
}

#[test]
fn test_run_without_registered_crafts() {
    let project = sales_project().unwrap();
    let output = run_craftline(&project, &["run", "prepare", "--parameters", "default"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("unknown craft 'clean'"), "stderr: {}", output.stderr);
}

#[test]
fn test_missing_manifest() {
    let temp = tempfile::TempDir::new().unwrap();
    assert_cmd::Command::cargo_bin("craftline")
        .unwrap()
        .arg("catalog")
        .arg("list")
        .env("NO_COLOR", "1")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("craftline.toml"));
}
