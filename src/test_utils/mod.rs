//! Test utilities for craftline
//!
//! This module provides helpers for writing tests: one-time logging setup
//! and [`TestProject`], a temporary project directory with a manifest and
//! helpers to write its YAML files.
//!
//! # Example
//!
//! ```rust,no_run
//! use craftline::test_utils::TestProject;
//!
//! let project = TestProject::new("demo").unwrap();
//! project.catalog("main.yaml", "raw:\n  type: json\n  path: raw.json\n").unwrap();
//! let session = project.session().unwrap();
//! assert!(session.catalog().contains("raw"));
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{MANIFEST_FILE, PathsSection};
use crate::session::Session;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`. Logging stays off when
/// neither is set. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=craftline=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A craftline project in a temporary directory, removed on drop.
///
/// Directories follow the default `[paths]` layout.
pub struct TestProject {
    temp: TempDir,
    paths: PathsSection,
}

impl TestProject {
    /// Create the directory and write a manifest for project `name`.
    pub fn new(name: &str) -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        fs::write(temp.path().join(MANIFEST_FILE), format!("[project]\nname = \"{name}\"\n"))?;
        Ok(Self {
            temp,
            paths: PathsSection::default(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root().join(MANIFEST_FILE)
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root().join(&self.paths.data)
    }

    /// Write `content` at `relative`, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a file into the configuration directory.
    pub fn configuration(&self, file: &str, content: &str) -> Result<PathBuf> {
        self.write(self.paths.configuration.join(file), content)
    }

    /// Write a file into the catalog directory.
    pub fn catalog(&self, file: &str, content: &str) -> Result<PathBuf> {
        self.write(self.paths.catalog.join(file), content)
    }

    /// Write a file into the parameters directory.
    pub fn parameters(&self, file: &str, content: &str) -> Result<PathBuf> {
        self.write(self.paths.parameters.join(file), content)
    }

    /// Write a file into the pipelines directory.
    pub fn pipelines(&self, file: &str, content: &str) -> Result<PathBuf> {
        self.write(self.paths.pipelines.join(file), content)
    }

    /// Write a file into the data directory.
    pub fn data(&self, file: &str, content: &str) -> Result<PathBuf> {
        self.write(self.paths.data.join(file), content)
    }

    /// Read a file from the data directory.
    pub fn read_data(&self, file: &str) -> Result<String> {
        let path = self.data_dir().join(file);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Load the project.
    pub fn session(&self) -> Result<Session> {
        Session::load(self.root())
    }
}
