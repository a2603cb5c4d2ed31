//! The `craftline.toml` project manifest.
//!
//! ```toml
//! [project]
//! name = "sales-forecast"
//!
//! [paths]
//! configuration = "lib/configuration"
//! catalog = "lib/catalog"
//! parameters = "lib/parameters"
//! pipelines = "lib/pipelines"
//! data = "data"
//! ```
//!
//! Every path is relative to the directory holding the manifest. The
//! `[paths]` table and each of its keys are optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::parse_config;
use crate::core::CraftlineError;

/// Manifest file name searched for by discovery.
pub const MANIFEST_FILE: &str = "craftline.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub project: ProjectSection,
    #[serde(default)]
    pub paths: PathsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Directory holding `globals*.yaml` and `locals*.yaml`
    pub configuration: PathBuf,
    /// Directory holding artifact declarations
    pub catalog: PathBuf,
    /// Directory holding parameter sets
    pub parameters: PathBuf,
    /// Directory holding pipeline definitions
    pub pipelines: PathBuf,
    /// Anchor for relative artifact paths
    pub data: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            configuration: PathBuf::from("lib/configuration"),
            catalog: PathBuf::from("lib/catalog"),
            parameters: PathBuf::from("lib/parameters"),
            pipelines: PathBuf::from("lib/pipelines"),
            data: PathBuf::from("data"),
        }
    }
}

impl ProjectManifest {
    pub fn load(path: &Path) -> Result<Self> {
        parse_config(path)
    }
}

/// Search `start` and its ancestors for [`MANIFEST_FILE`].
pub fn find_manifest_from(start: &Path) -> Result<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        current = dir.parent();
    }
    Err(CraftlineError::ManifestNotFound.into())
}

/// Search from the working directory.
pub fn find_manifest() -> Result<PathBuf> {
    let current = std::env::current_dir().context("Cannot determine current working directory")?;
    find_manifest_from(&current)
}

/// Use `explicit` when given, otherwise search from the working directory.
pub fn find_manifest_with_optional(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_file() => Ok(path),
        Some(_) => Err(CraftlineError::ManifestNotFound.into()),
        None => find_manifest(),
    }
}
