//! Type-specific artifact readers and writers.
//!
//! An adapter turns a [`ResolvedDeclaration`] into a value on load and a
//! value into stored bytes on save. The catalog selects it by the
//! declaration's `type`. Built-in adapters are file based: they read the
//! resolved `path` field and exchange bytes through the backend registry.
//!
//! | Type   | Payload                                      |
//! |--------|----------------------------------------------|
//! | `json` | any value, stored as JSON                    |
//! | `yaml` | any value, stored as YAML                    |
//! | `toml` | a mapping, stored as TOML                    |
//! | `text` | a string, stored as UTF-8                    |

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::backend::BackendRegistry;
use super::declaration::ResolvedDeclaration;
use crate::core::Params;

/// Everything an adapter gets to see for one load or save.
#[derive(Debug, Clone, Copy)]
pub struct AdapterRequest<'a> {
    /// The declaration with `extra` resolved for this call
    pub declaration: &'a ResolvedDeclaration,
    /// The dynamic namespace of the call
    pub args: &'a Params,
    /// Byte storage, selected by the path's scheme
    pub backends: &'a BackendRegistry,
}

impl AdapterRequest<'_> {
    /// The resolved `path` field, required by file-based adapters.
    pub fn path(&self) -> Result<&str> {
        self.declaration.path().ok_or_else(|| {
            anyhow!("artifact '{}' has no string 'path' field", self.declaration.name)
        })
    }

    /// A boolean option, `default` when unset.
    #[must_use]
    pub fn flag(options: &Params, key: &str, default: bool) -> bool {
        options.get(key).and_then(Value::as_bool).unwrap_or(default)
    }
}

/// Loads and saves one artifact type.
pub trait Adapter: Send + Sync {
    /// Read the artifact described by `request`.
    fn load(&self, request: &AdapterRequest<'_>) -> Result<Value>;

    /// Persist `payload` as the artifact described by `request`.
    fn save(&self, request: &AdapterRequest<'_>, payload: &Value) -> Result<()>;
}

/// Serialization format of a [`FileAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
    Text,
}

/// Built-in adapter storing a value in one file.
///
/// Load options: none. Save options: `pretty` (JSON only, default `true`).
#[derive(Debug, Clone, Copy)]
pub struct FileAdapter {
    format: FileFormat,
}

impl FileAdapter {
    #[must_use]
    pub const fn new(format: FileFormat) -> Self {
        Self {
            format,
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let text = std::str::from_utf8(bytes).context("artifact content is not valid UTF-8")?;
        Ok(match self.format {
            FileFormat::Json => serde_json::from_str(text).context("invalid JSON content")?,
            FileFormat::Yaml => serde_yaml::from_str(text).context("invalid YAML content")?,
            FileFormat::Toml => {
                let table: toml::Table = toml::from_str(text).context("invalid TOML content")?;
                serde_json::to_value(table)?
            }
            FileFormat::Text => Value::String(text.to_string()),
        })
    }

    fn encode(&self, payload: &Value, options: &Params) -> Result<Vec<u8>> {
        let text = match self.format {
            FileFormat::Json if AdapterRequest::flag(options, "pretty", true) => {
                serde_json::to_string_pretty(payload)?
            }
            FileFormat::Json => serde_json::to_string(payload)?,
            FileFormat::Yaml => serde_yaml::to_string(payload)?,
            FileFormat::Toml => {
                if !payload.is_object() {
                    bail!("toml artifacts must be mappings");
                }
                toml::to_string(payload).context("value cannot be represented as TOML")?
            }
            FileFormat::Text => match payload {
                Value::String(s) => s.clone(),
                other => bail!("text artifacts must be strings, got {other}"),
            },
        };
        Ok(text.into_bytes())
    }
}

impl Adapter for FileAdapter {
    fn load(&self, request: &AdapterRequest<'_>) -> Result<Value> {
        let path = request.path()?;
        let bytes = request.backends.get(path)?;
        self.decode(&bytes).with_context(|| format!("Failed to decode {path}"))
    }

    fn save(&self, request: &AdapterRequest<'_>, payload: &Value) -> Result<()> {
        let path = request.path()?;
        let bytes = self.encode(payload, &request.declaration.save_options)?;
        request.backends.put(path, &bytes)
    }
}

/// Adapters keyed by artifact type.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in file adapters.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("json", Arc::new(FileAdapter::new(FileFormat::Json)));
        registry.register("yaml", Arc::new(FileAdapter::new(FileFormat::Yaml)));
        registry.register("toml", Arc::new(FileAdapter::new(FileFormat::Toml)));
        registry.register("text", Arc::new(FileAdapter::new(FileFormat::Text)));
        registry
    }

    /// Register or replace the adapter for `artifact_type`.
    pub fn register(&mut self, artifact_type: impl Into<String>, adapter: Arc<dyn Adapter>) {
        self.adapters.insert(artifact_type.into(), adapter);
    }

    #[must_use]
    pub fn get(&self, artifact_type: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(artifact_type).cloned()
    }

    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry").field("types", &self.types()).finish()
    }
}
