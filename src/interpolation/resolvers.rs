//! Static and dynamic placeholder resolution.
//!
//! Static placeholders are dotted paths into the layered configuration built
//! from the project's `globals*.yaml` (base) and `locals*.yaml` (override)
//! files. Dynamic placeholders are bare names looked up in the call-time
//! arguments. Both follow the same rule for the shape of the result: a
//! field made of exactly one placeholder takes the resolved value as-is,
//! otherwise the value is stringified and concatenated with the literals.

use serde_json::Value;

use crate::core::{CraftlineError, Params, Result, lookup_path, recursive_merge};

/// Two-layer configuration used to resolve `{{ path }}` placeholders.
///
/// The override layer wins on key collisions. A key explicitly set to
/// `null` in either layer is present, not missing.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    base: Params,
    overrides: Params,
    merged: Params,
}

impl StaticConfig {
    #[must_use]
    pub fn new(base: Params, overrides: Params) -> Self {
        let mut merged = base.clone();
        recursive_merge(&mut merged, &overrides);
        Self {
            base,
            overrides,
            merged,
        }
    }

    /// Look up a dotted path in the merged layers.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.merged, path)
    }

    /// Resolve a static placeholder body, naming `artifact` on failure.
    pub fn resolve(&self, path: &str, artifact: &str) -> Result<Value> {
        self.get(path).cloned().ok_or_else(|| CraftlineError::UnresolvedStatic {
            path: path.to_string(),
            artifact: artifact.to_string(),
        })
    }

    #[must_use]
    pub const fn base(&self) -> &Params {
        &self.base
    }

    #[must_use]
    pub const fn overrides(&self) -> &Params {
        &self.overrides
    }

    /// The merged view, override over base.
    #[must_use]
    pub const fn merged(&self) -> &Params {
        &self.merged
    }
}

/// Resolve a dynamic placeholder body against call-time arguments.
///
/// Dotted names descend into mapping arguments, so `!{ run.date }` works
/// when `run` was passed as a mapping.
pub fn resolve_dynamic(args: &Params, name: &str, artifact: &str) -> Result<Value> {
    lookup_path(args, name).cloned().ok_or_else(|| CraftlineError::UnresolvedDynamic {
        name: name.to_string(),
        artifact: artifact.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_override_wins_then_falls_back_to_base() {
        let config = StaticConfig::new(params(json!({"a": {"b": 2}})), params(json!({"a": {"b": 1}})));
        assert_eq!(config.resolve("a.b", "x").unwrap(), json!(1));

        let config = StaticConfig::new(params(json!({"a": {"b": 2}})), params(json!({"a": {}})));
        assert_eq!(config.resolve("a.b", "x").unwrap(), json!(2));
    }

    #[test]
    fn test_null_counts_as_present() {
        let config = StaticConfig::new(params(json!({"a": 2})), params(json!({"a": null})));
        assert_eq!(config.resolve("a", "x").unwrap(), Value::Null);
    }

    #[test]
    fn test_missing_static_names_path_and_artifact() {
        let config = StaticConfig::default();
        match config.resolve("db.host", "sales").unwrap_err() {
            CraftlineError::UnresolvedStatic { path, artifact } => {
                assert_eq!(path, "db.host");
                assert_eq!(artifact, "sales");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dynamic_lookup() {
        let args = params(json!({"x": "v", "run": {"date": "2024"}}));
        assert_eq!(resolve_dynamic(&args, "x", "a").unwrap(), json!("v"));
        assert_eq!(resolve_dynamic(&args, "run.date", "a").unwrap(), json!("2024"));
        assert!(matches!(
            resolve_dynamic(&args, "y", "a"),
            Err(CraftlineError::UnresolvedDynamic { .. })
        ));
    }
}
