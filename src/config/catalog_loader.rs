//! Loading artifact declarations from the catalog directory.
//!
//! ```yaml
//! model_input:
//!   type: json
//!   path: "{{ storage.root }}/!{ region }/input.json"
//!   nullable: [path]
//!   load_options:
//!     strict: true
//! ```
//!
//! Static placeholders are bound here, dynamic and expression spans wait
//! for call time.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use super::layers::yaml_files;
use super::parse_mapping;
use crate::catalog::{ArtifactDeclaration, Catalog};
use crate::core::{CraftlineError, Params};
use crate::interpolation::{RenderMode, Scope, StaticConfig, render_value};

const ARTIFACT_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.\-]*$";

#[derive(Debug, Deserialize)]
struct ArtifactRecord {
    #[serde(rename = "type")]
    artifact_type: String,
    #[serde(default)]
    load_options: Params,
    #[serde(default)]
    save_options: Params,
    #[serde(default)]
    nullable: Vec<String>,
    #[serde(default)]
    expressions: Vec<String>,
    #[serde(flatten)]
    extra: Params,
}

/// Build a catalog from every YAML file under `dir`.
pub fn load_catalog(dir: &Path, config: StaticConfig, data_root: &Path) -> Result<Catalog> {
    let mut catalog = Catalog::new(config, data_root);
    if !dir.is_dir() {
        debug!("no catalog directory at {}", dir.display());
        return Ok(catalog);
    }

    let name_pattern = Regex::new(ARTIFACT_NAME_PATTERN)?;
    for path in yaml_files(dir, "**/*")? {
        debug!("loading catalog file {}", path.display());
        for (name, entry) in parse_mapping(&path)? {
            if !name_pattern.is_match(&name) {
                return Err(CraftlineError::ConfigError {
                    message: format!("invalid artifact name '{}' in {}", name, path.display()),
                }
                .into());
            }
            let declaration = declaration_from(&name, entry, catalog.config())
                .with_context(|| format!("Invalid declaration '{}' in {}", name, path.display()))?;
            catalog.insert(declaration)?;
        }
    }
    Ok(catalog)
}

fn declaration_from(name: &str, entry: Value, config: &StaticConfig) -> Result<ArtifactDeclaration> {
    let record: ArtifactRecord = serde_json::from_value(entry)?;

    let empty = Params::new();
    let scope = Scope::new(config, &empty, name);
    let mut declaration = ArtifactDeclaration::new(name, record.artifact_type);
    for (field, value) in &record.extra {
        declaration.extra.insert(field.clone(), render_value(value, &scope, RenderMode::StaticOnly)?);
    }
    declaration.load_options = record.load_options;
    declaration.save_options = record.save_options;

    for field in record.nullable {
        if !declaration.extra.contains_key(&field) {
            warn!("artifact '{}' marks unknown field '{}' as nullable", name, field);
        }
        declaration = declaration.nullable(field);
    }
    for field in record.expressions {
        if !declaration.extra.contains_key(&field) {
            warn!("artifact '{}' marks unknown field '{}' as an expression", name, field);
        }
        declaration = declaration.expression(field);
    }
    Ok(declaration)
}
