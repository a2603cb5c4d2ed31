//! Validate a craftline project.
//!
//! Each component is loaded on its own so a failure in one does not hide
//! problems in the others:
//!
//! 1. Manifest (`craftline.toml`)
//! 2. Static configuration
//! 3. Catalog, including the static pass over every declaration
//! 4. Parameter sets, each fully expanded
//! 5. Pipeline definitions, each built against the registered crafts
//!
//! Output uses `✓` for a passing component, `✗` for a failing one and `⚠`
//! for a warning. `--format json` prints [`ValidationResults`] instead.

use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::config::{
    ParameterSets, PipelineDefinitions, ProjectManifest, find_manifest_with_optional, load_catalog,
    load_static_config,
};
use crate::craft::CraftRegistry;
use crate::interpolation::StaticConfig;

#[derive(Args)]
pub struct ValidateCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Default, Serialize)]
pub struct ValidationResults {
    pub valid: bool,
    pub manifest_valid: bool,
    pub configuration_valid: bool,
    pub global_keys: usize,
    pub local_keys: usize,
    pub catalog_valid: bool,
    pub artifacts: usize,
    pub parameters_valid: bool,
    pub parameter_sets: usize,
    pub pipelines_valid: bool,
    pub pipelines: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResults {
    fn fail(&mut self, component: &str, error: &anyhow::Error) {
        self.errors.push(format!("{component}: {error:#}"));
    }
}

impl ValidateCommand {
    pub fn execute(self, manifest_path: Option<PathBuf>, registry: &CraftRegistry) -> Result<()> {
        let results = validate_project(manifest_path, registry);
        self.report(&results)?;
        if !results.valid {
            bail!("Validation failed with {} error(s)", results.errors.len());
        }
        Ok(())
    }

    fn report(&self, results: &ValidationResults) -> Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(results)?);
            return Ok(());
        }

        let line = |ok: bool, label: String| {
            if ok {
                println!("{} {}", "✓".green(), label);
            } else {
                println!("{} {}", "✗".red(), label);
            }
        };
        line(results.manifest_valid, "Manifest".to_string());
        if results.manifest_valid {
            line(
                results.configuration_valid,
                format!(
                    "Static configuration ({} global keys, {} local keys)",
                    results.global_keys, results.local_keys
                ),
            );
            line(results.catalog_valid, format!("Catalog ({} artifacts)", results.artifacts));
            line(
                results.parameters_valid,
                format!("Parameter sets ({})", results.parameter_sets),
            );
            line(results.pipelines_valid, format!("Pipelines ({})", results.pipelines));
        }
        for error in &results.errors {
            println!("  {} {}", "✗".red(), error);
        }
        for warning in &results.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
        if results.valid {
            println!("{}", "✓ Project is valid".green().bold());
        }
        Ok(())
    }
}

/// Load every component of the project and collect what fails.
pub fn validate_project(manifest_path: Option<PathBuf>, registry: &CraftRegistry) -> ValidationResults {
    let mut results = ValidationResults::default();

    let manifest_path = match find_manifest_with_optional(manifest_path) {
        Ok(path) => path,
        Err(e) => {
            results.fail("manifest", &e);
            return results;
        }
    };
    let manifest = match ProjectManifest::load(&manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            results.fail("manifest", &e);
            return results;
        }
    };
    results.manifest_valid = true;
    let root = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let paths = &manifest.paths;

    let config = match load_static_config(&root.join(&paths.configuration)) {
        Ok(config) => {
            results.configuration_valid = true;
            results.global_keys = config.base().len();
            results.local_keys = config.overrides().len();
            config
        }
        Err(e) => {
            results.fail("configuration", &e);
            StaticConfig::default()
        }
    };

    // Catalog errors are only meaningful when the configuration loaded
    if results.configuration_valid {
        match load_catalog(&root.join(&paths.catalog), config, &root.join(&paths.data)) {
            Ok(catalog) => {
                results.catalog_valid = true;
                results.artifacts = catalog.names().count();
                check_adapters(&catalog, &mut results);
            }
            Err(e) => results.fail("catalog", &e),
        }
    } else {
        results.warnings.push("catalog not checked: configuration failed to load".to_string());
    }

    match ParameterSets::load(&root.join(&paths.parameters)) {
        Ok(sets) => {
            results.parameter_sets = sets.len();
            results.parameters_valid = true;
            for name in sets.names() {
                if let Err(e) = sets.expand(name) {
                    results.parameters_valid = false;
                    results.errors.push(format!("parameter set '{name}': {e}"));
                }
            }
        }
        Err(e) => results.fail("parameters", &e),
    }

    match PipelineDefinitions::load(&root.join(&paths.pipelines)) {
        Ok(definitions) => {
            results.pipelines = definitions.len();
            results.pipelines_valid = true;
            if registry.is_empty() && !definitions.is_empty() {
                results
                    .warnings
                    .push("no crafts registered, pipeline definitions were not built".to_string());
            } else {
                for name in definitions.names() {
                    if let Err(e) = definitions.build(name, registry) {
                        results.pipelines_valid = false;
                        results.errors.push(format!("pipeline '{name}': {e}"));
                    }
                }
            }
        }
        Err(e) => results.fail("pipelines", &e),
    }

    results.valid = results.manifest_valid
        && results.configuration_valid
        && results.catalog_valid
        && results.parameters_valid
        && results.pipelines_valid;
    results
}

fn check_adapters(catalog: &Catalog, results: &mut ValidationResults) {
    for declaration in catalog.declarations() {
        if catalog.adapters().get(&declaration.artifact_type).is_none() {
            results.warnings.push(format!(
                "artifact '{}' uses type '{}' which has no registered adapter",
                declaration.name, declaration.artifact_type
            ));
        }
    }
}
