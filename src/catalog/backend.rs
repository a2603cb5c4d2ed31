//! Byte storage backends for path-based artifacts.
//!
//! A resolved artifact path selects its backend by URI scheme:
//!
//! | Location                 | Backend              |
//! |--------------------------|----------------------|
//! | `data/sales.csv`         | [`LocalFsBackend`]   |
//! | `file:///tmp/sales.csv`  | [`LocalFsBackend`]   |
//! | `memory://scratch/model` | [`InMemoryBackend`]  |
//!
//! Other schemes are served by backends registered with
//! [`BackendRegistry::register`].

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::CraftlineError;

/// A parsed artifact location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// URI scheme, empty for plain paths
    pub scheme: String,
    /// Everything after `scheme://`, or the whole string for plain paths
    pub path: String,
}

impl Location {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once("://") {
            Some((scheme, path))
                if !scheme.is_empty()
                    && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
            {
                Self {
                    scheme: scheme.to_ascii_lowercase(),
                    path: path.to_string(),
                }
            }
            _ => Self {
                scheme: String::new(),
                path: raw.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scheme.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}://{}", self.scheme, self.path)
        }
    }
}

/// Low-level byte exchange with a storage service.
pub trait Backend: Send + Sync {
    /// Fetch the payload stored at `location`.
    fn get(&self, location: &Location) -> Result<Vec<u8>>;

    /// Store `payload` at `location`, replacing any previous content.
    fn put(&self, location: &Location, payload: &[u8]) -> Result<()>;
}

/// Local filesystem storage. Relative paths are anchored at `root`.
#[derive(Debug, Clone)]
pub struct LocalFsBackend {
    root: PathBuf,
}

impl LocalFsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    fn full_path(&self, location: &Location) -> PathBuf {
        let path = Path::new(&location.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Backend for LocalFsBackend {
    fn get(&self, location: &Location) -> Result<Vec<u8>> {
        let path = self.full_path(location);
        fs::read(&path).with_context(|| format!("Failed to read artifact file: {}", path.display()))
    }

    fn put(&self, location: &Location, payload: &[u8]) -> Result<()> {
        let path = self.full_path(location);
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        // Write next to the target, then rename over it
        let mut temp = tempfile::NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
        temp.write_all(payload)
            .with_context(|| format!("Failed to write artifact file: {}", path.display()))?;
        temp.persist(&path)
            .with_context(|| format!("Failed to move artifact into place: {}", path.display()))?;

        tracing::debug!("wrote {} bytes to {}", payload.len(), path.display());
        Ok(())
    }
}

/// Process-local storage, keyed by location path.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    store: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Result<Vec<String>> {
        let store = self.store.lock().map_err(|_| anyhow!("in-memory backend lock poisoned"))?;
        let mut keys: Vec<String> = store.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl Backend for InMemoryBackend {
    fn get(&self, location: &Location) -> Result<Vec<u8>> {
        let store = self.store.lock().map_err(|_| anyhow!("in-memory backend lock poisoned"))?;
        store.get(&location.path).cloned().ok_or_else(|| anyhow!("nothing stored at '{location}'"))
    }

    fn put(&self, location: &Location, payload: &[u8]) -> Result<()> {
        let mut store =
            self.store.lock().map_err(|_| anyhow!("in-memory backend lock poisoned"))?;
        store.insert(location.path.clone(), payload.to_vec());
        Ok(())
    }
}

/// Backends keyed by URI scheme.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl BackendRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Local files under `data_root` for plain paths and `file://`, plus `memory://`.
    pub fn with_defaults(data_root: impl Into<PathBuf>) -> Self {
        let local: Arc<dyn Backend> = Arc::new(LocalFsBackend::new(data_root));
        let mut registry = Self::new();
        registry.register("", Arc::clone(&local));
        registry.register("file", local);
        registry.register("memory", Arc::new(InMemoryBackend::new()));
        registry
    }

    /// Register or replace the backend for `scheme`.
    pub fn register(&mut self, scheme: impl Into<String>, backend: Arc<dyn Backend>) {
        let scheme = scheme.into();
        tracing::debug!("registering '{}' backend", scheme);
        self.backends.insert(scheme, backend);
    }

    /// The backend serving `location`.
    pub fn backend_for(&self, location: &Location) -> crate::core::Result<Arc<dyn Backend>> {
        self.backends.get(&location.scheme).cloned().ok_or_else(|| {
            CraftlineError::UnknownBackend {
                scheme: location.scheme.clone(),
                location: location.to_string(),
            }
        })
    }

    pub fn get(&self, raw: &str) -> Result<Vec<u8>> {
        let location = Location::parse(raw);
        self.backend_for(&location)?.get(&location)
    }

    pub fn put(&self, raw: &str, payload: &[u8]) -> Result<()> {
        let location = Location::parse(raw);
        self.backend_for(&location)?.put(&location, payload)
    }

    #[must_use]
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry").field("schemes", &self.schemes()).finish()
    }
}
