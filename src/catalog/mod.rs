//! Artifact catalog
//!
//! The catalog maps logical artifact names to declarations and resolves them
//! for each call. A declaration's `extra` fields carry placeholders whose
//! static part was already bound when the catalog was loaded; [`Catalog::resolve`]
//! binds what remains against the caller's arguments.
//!
//! # Resolution
//!
//! 1. Look up the declaration ([`CraftlineError::UnknownArtifact`] if absent).
//! 2. Copy `extra`, `load_options` and `save_options`.
//! 3. Render every string inside `extra`: static then dynamic placeholders,
//!    plus expressions for fields listed in `expressions`.
//! 4. A field listed in `nullable` whose dynamic placeholder is missing
//!    resolves to `null` instead of failing.
//!
//! [`Catalog::load`] and [`Catalog::save`] resolve and then dispatch to the
//! adapter registered for the declaration's type. Adapter failures are
//! wrapped in [`CraftlineError::Adapter`] with the artifact name and type.
//!
//! # Examples
//!
//! ```rust,no_run
//! use craftline::catalog::{ArtifactDeclaration, Catalog};
//! use craftline::core::Params;
//! use craftline::interpolation::StaticConfig;
//! use serde_json::json;
//!
//! # fn example() -> craftline::core::Result<()> {
//! let mut catalog = Catalog::new(StaticConfig::default(), "data");
//! catalog.insert(
//!     ArtifactDeclaration::new("sales", "json").with_extra("path", "raw/sales_!{ date }.json"),
//! )?;
//!
//! let mut args = Params::new();
//! args.insert("date".into(), json!("2024-01-01"));
//! catalog.save("sales", &json!([1, 2, 3]), &args)?;
//! assert_eq!(catalog.load("sales", &args)?, json!([1, 2, 3]));
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod backend;
pub mod declaration;

pub use adapters::{Adapter, AdapterRegistry, AdapterRequest, FileAdapter, FileFormat};
pub use backend::{Backend, BackendRegistry, InMemoryBackend, LocalFsBackend, Location};
pub use declaration::{ArtifactDeclaration, ResolvedDeclaration};

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use strsim::levenshtein;
use tracing::debug;

use crate::core::{CraftlineError, Params, Result};
use crate::interpolation::{RenderMode, Scope, StaticConfig, render_value};

/// Maximum edit distance, as a percentage of the name length, for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Name-indexed artifact declarations plus the machinery to load and save them.
///
/// The catalog is read-only during pipeline execution and can be shared
/// between sequential runs.
#[derive(Debug, Clone)]
pub struct Catalog {
    declarations: BTreeMap<String, ArtifactDeclaration>,
    config: StaticConfig,
    adapters: AdapterRegistry,
    backends: BackendRegistry,
}

impl Catalog {
    /// An empty catalog with the built-in adapters and default backends,
    /// anchoring relative paths at `data_root`.
    pub fn new(config: StaticConfig, data_root: impl Into<PathBuf>) -> Self {
        Self {
            declarations: BTreeMap::new(),
            config,
            adapters: AdapterRegistry::with_builtins(),
            backends: BackendRegistry::with_defaults(data_root),
        }
    }

    /// Add a declaration. Names must be unique.
    pub fn insert(&mut self, declaration: ArtifactDeclaration) -> Result<()> {
        if self.declarations.contains_key(&declaration.name) {
            return Err(CraftlineError::ConfigError {
                message: format!("artifact '{}' is declared more than once", declaration.name),
            });
        }
        self.declarations.insert(declaration.name.clone(), declaration);
        Ok(())
    }

    pub fn register_adapter(&mut self, artifact_type: impl Into<String>, adapter: Arc<dyn Adapter>) {
        self.adapters.register(artifact_type, adapter);
    }

    pub fn register_backend(&mut self, scheme: impl Into<String>, backend: Arc<dyn Backend>) {
        self.backends.register(scheme, backend);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    /// Artifact names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &ArtifactDeclaration> {
        self.declarations.values()
    }

    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&ArtifactDeclaration> {
        self.declarations.get(name)
    }

    #[must_use]
    pub const fn config(&self) -> &StaticConfig {
        &self.config
    }

    #[must_use]
    pub const fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    #[must_use]
    pub const fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// Bind the placeholders of `name`'s declaration against `args`.
    pub fn resolve(&self, name: &str, args: &Params) -> Result<ResolvedDeclaration> {
        let declaration = self.lookup(name)?;
        debug!("resolving artifact '{}'", name);

        let scope = Scope::new(&self.config, args, name);
        let mut extra = Params::new();
        for (field, value) in &declaration.extra {
            let mode = RenderMode::Call {
                expressions: declaration.is_expression(field),
            };
            let rendered = match render_value(value, &scope, mode) {
                Ok(rendered) => rendered,
                Err(CraftlineError::UnresolvedDynamic {
                    name: missing,
                    ..
                }) if declaration.is_nullable(field) => {
                    debug!("field '{}' of '{}' left null: '{}' not supplied", field, name, missing);
                    Value::Null
                }
                Err(e) => return Err(e),
            };
            extra.insert(field.clone(), rendered);
        }

        Ok(ResolvedDeclaration {
            name: declaration.name.clone(),
            artifact_type: declaration.artifact_type.clone(),
            extra,
            load_options: declaration.load_options.clone(),
            save_options: declaration.save_options.clone(),
        })
    }

    /// Resolve `name` and read it through its adapter.
    pub fn load(&self, name: &str, args: &Params) -> Result<Value> {
        let resolved = self.resolve(name, args)?;
        let adapter = self.adapter_for(&resolved)?;
        let request = AdapterRequest {
            declaration: &resolved,
            args,
            backends: &self.backends,
        };
        debug!("loading artifact '{}' ({})", name, resolved.artifact_type);
        adapter.load(&request).map_err(|source| adapter_error(&resolved, source))
    }

    /// Resolve `name` and write `payload` through its adapter.
    pub fn save(&self, name: &str, payload: &Value, args: &Params) -> Result<()> {
        let resolved = self.resolve(name, args)?;
        let adapter = self.adapter_for(&resolved)?;
        let request = AdapterRequest {
            declaration: &resolved,
            args,
            backends: &self.backends,
        };
        debug!("saving artifact '{}' ({})", name, resolved.artifact_type);
        adapter.save(&request, payload).map_err(|source| adapter_error(&resolved, source))
    }

    fn lookup(&self, name: &str) -> Result<&ArtifactDeclaration> {
        self.declarations.get(name).ok_or_else(|| CraftlineError::UnknownArtifact {
            name: name.to_string(),
            suggestion: self.closest_name(name),
        })
    }

    fn adapter_for(&self, resolved: &ResolvedDeclaration) -> Result<Arc<dyn Adapter>> {
        self.adapters.get(&resolved.artifact_type).ok_or_else(|| CraftlineError::UnknownAdapter {
            artifact: resolved.name.clone(),
            artifact_type: resolved.artifact_type.clone(),
        })
    }

    /// Closest declared name by Levenshtein distance, if reasonably close.
    fn closest_name(&self, target: &str) -> Option<String> {
        let limit = (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        self.declarations
            .keys()
            .map(|name| (levenshtein(target, name), name))
            .filter(|(distance, _)| *distance <= limit)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name.clone())
    }
}

fn adapter_error(resolved: &ResolvedDeclaration, source: anyhow::Error) -> CraftlineError {
    CraftlineError::Adapter {
        artifact: resolved.name.clone(),
        artifact_type: resolved.artifact_type.clone(),
        source,
    }
}
