use craftline::core::CraftlineError;
use craftline::session::Session;
use serde_json::json;

use crate::common::{TestProject, sales_project, sales_registry};

#[test]
fn test_parameter_set_drives_pipeline_definition() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let registry = sales_registry();

    let args = session.parameters("south").unwrap();
    assert_eq!(args["region"], json!("south"));
    assert_eq!(args["clean"], json!({"minimum": 10}));

    let outcome = session.run_pipeline("reporting", &registry, &args).unwrap();
    assert_eq!(outcome.volatiles["total"], json!(40));
    assert_eq!(project.read_data("out_local/report.txt").unwrap(), "south: 40");
}

#[test]
fn test_pipeline_definition_order_follows_data() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();
    let pipeline = session.pipeline("reporting", &sales_registry()).unwrap();
    assert_eq!(pipeline.name(), "reporting");
    assert_eq!(pipeline.order(), vec!["clean", "summarize", "report"]);
}

#[test]
fn test_unknown_names() {
    let project = sales_project().unwrap();
    let session = project.session().unwrap();

    assert!(matches!(session.parameters("nope"), Err(CraftlineError::UnknownParameterSet { .. })));
    assert!(matches!(
        session.pipeline("nope", &sales_registry()),
        Err(CraftlineError::UnknownPipeline { .. })
    ));
    assert!(matches!(
        session.pipeline("reporting", &craftline::craft::CraftRegistry::new()),
        Err(CraftlineError::UnknownCraft { .. })
    ));
}

#[test]
fn test_custom_paths_in_manifest() {
    let project = TestProject::new("custom").unwrap();
    project
        .write(
            "craftline.toml",
            "[project]\nname = \"custom\"\n\n[paths]\ncatalog = \"defs\"\ndata = \"store\"\n",
        )
        .unwrap();
    project.write("defs/one.yaml", "one:\n  type: text\n  path: one.txt\n").unwrap();

    let session = Session::load(project.root()).unwrap();
    assert!(session.catalog().contains("one"));
    session.catalog().save("one", &json!("1"), &serde_json::Map::new()).unwrap();
    assert!(project.root().join("store/one.txt").is_file());
}

#[test]
fn test_discover_walks_up() {
    let project = sales_project().unwrap();
    let nested = project.data_dir().join("raw");
    let session = Session::discover(&nested).unwrap();
    assert_eq!(session.manifest().project.name, "sales");
    assert_eq!(session.parameter_sets().len(), 2);
    assert_eq!(session.pipeline_definitions().len(), 2);
}

#[test]
fn test_broken_parameter_file_names_the_file() {
    let project = sales_project().unwrap();
    project.parameters("broken.yaml", "bad: [unclosed\n").unwrap();
    let err = project.session().unwrap_err();
    assert!(format!("{err:#}").contains("broken.yaml"), "got: {err:#}");
}
