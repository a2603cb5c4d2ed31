//! Layered static configuration.
//!
//! The base layer is every `globals*.yaml` file of the configuration
//! directory, the override layer every `locals*.yaml` file. Files of one
//! layer are merged recursively in sorted path order.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::parse_mapping;
use crate::core::{Params, recursive_merge};
use crate::interpolation::StaticConfig;

/// Load both layers from `dir`. A missing directory yields an empty configuration.
pub fn load_static_config(dir: &Path) -> Result<StaticConfig> {
    if !dir.is_dir() {
        debug!("no configuration directory at {}", dir.display());
        return Ok(StaticConfig::default());
    }
    let base = load_layer(dir, "globals")?;
    let overrides = load_layer(dir, "locals")?;
    Ok(StaticConfig::new(base, overrides))
}

fn load_layer(dir: &Path, prefix: &str) -> Result<Params> {
    let mut layer = Params::new();
    for path in yaml_files(dir, &format!("{prefix}*"))? {
        debug!("loading {} layer from {}", prefix, path.display());
        recursive_merge(&mut layer, &parse_mapping(&path)?);
    }
    Ok(layer)
}

/// YAML files under `dir` matching `stem_pattern`, sorted.
pub(crate) fn yaml_files(dir: &Path, stem_pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for extension in ["yaml", "yml"] {
        let pattern = dir.join(format!("{stem_pattern}.{extension}"));
        let pattern = pattern.to_string_lossy();
        for entry in glob::glob(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))? {
            let path = entry.with_context(|| format!("Failed to read entry matching {pattern}"))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
