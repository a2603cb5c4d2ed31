//! Argument parsing and configuration tests for the CLI.

use super::Cli;
use clap::Parser;

#[test]
fn test_cli_parsing() {
    assert!(Cli::try_parse_from(["craftline", "--help"]).is_err());
    assert!(Cli::try_parse_from(["craftline", "validate"]).is_ok());
    assert!(Cli::try_parse_from(["craftline", "catalog", "list"]).is_ok());
    assert!(Cli::try_parse_from(["craftline", "bogus"]).is_err());
}

#[test]
fn test_verbose_and_quiet_flags() {
    let cli = Cli::try_parse_from(["craftline", "--verbose", "validate"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

    let cli = Cli::try_parse_from(["craftline", "validate", "-q"]).unwrap();
    assert!(cli.quiet);
    assert_eq!(cli.build_config().log_level, None);

    assert!(Cli::try_parse_from(["craftline", "-v", "-q", "validate"]).is_err());

    let cli = Cli::try_parse_from(["craftline", "validate"]).unwrap();
    assert_eq!(cli.build_config().log_level.as_deref(), Some("info"));
}

#[test]
fn test_pipeline_show_arguments() {
    let cli = Cli::try_parse_from(["craftline", "pipeline", "show", "daily", "--format", "dot"]).unwrap();
    match cli.command {
        super::Commands::Pipeline(super::pipeline::PipelineCommand::Show(cmd)) => {
            assert_eq!(cmd.name, "daily");
            assert_eq!(cmd.format, super::pipeline::GraphFormat::Dot);
        }
        _ => panic!("expected pipeline show command"),
    }
    assert!(Cli::try_parse_from(["craftline", "pipeline", "list"]).is_ok());
    assert!(Cli::try_parse_from(["craftline", "pipeline", "show", "daily", "--format", "png"]).is_err());
}

#[test]
fn test_manifest_path_is_global() {
    let cli = Cli::try_parse_from(["craftline", "catalog", "list", "--manifest-path", "/tmp/x/craftline.toml"])
        .unwrap();
    assert_eq!(
        cli.build_config().manifest_path,
        Some(std::path::PathBuf::from("/tmp/x/craftline.toml"))
    );
}

#[test]
fn test_run_arguments() {
    let cli = Cli::try_parse_from([
        "craftline",
        "run",
        "training",
        "--parameters",
        "default",
        "--arg",
        "n=5",
        "--arg",
        "train.rate=0.1",
    ])
    .unwrap();
    match cli.command {
        super::Commands::Run(cmd) => {
            assert_eq!(cmd.pipeline, "training");
            assert_eq!(cmd.parameters.as_deref(), Some("default"));
            assert_eq!(cmd.args, vec!["n=5", "train.rate=0.1"]);
        }
        _ => panic!("expected run command"),
    }
}

#[test]
fn test_resolve_requires_name() {
    assert!(Cli::try_parse_from(["craftline", "catalog", "resolve"]).is_err());
    assert!(Cli::try_parse_from(["craftline", "catalog", "resolve", "raw", "--arg", "region=eu"]).is_ok());
}
