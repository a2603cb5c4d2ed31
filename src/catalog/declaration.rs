//! Artifact declarations as stored in the catalog.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::core::Params;

/// A catalog entry: a logical artifact name bound to a type and its
/// type-specific fields.
///
/// Declarations are immutable once the catalog is built. Resolution works on
/// a copy, see [`ResolvedDeclaration`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactDeclaration {
    /// Unique key in the catalog
    pub name: String,
    /// Adapter name (`json`, `yaml`, `toml`, `text` or a registered one)
    #[serde(rename = "type")]
    pub artifact_type: String,
    /// Interpolable, type-specific fields such as `path`
    pub extra: Params,
    /// Passed verbatim to the adapter on load
    pub load_options: Params,
    /// Passed verbatim to the adapter on save
    pub save_options: Params,
    /// `extra` fields that resolve to `null` when a dynamic placeholder is missing
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub nullable: BTreeSet<String>,
    /// `extra` fields whose `+{ }+` spans are evaluated
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub expressions: BTreeSet<String>,
}

impl ArtifactDeclaration {
    pub fn new(name: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifact_type: artifact_type.into(),
            extra: Params::new(),
            load_options: Params::new(),
            save_options: Params::new(),
            nullable: BTreeSet::new(),
            expressions: BTreeSet::new(),
        }
    }

    /// Set an `extra` field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_load_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.load_options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_save_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.save_options.insert(key.into(), value.into());
        self
    }

    /// Mark an `extra` field as nullable.
    #[must_use]
    pub fn nullable(mut self, field: impl Into<String>) -> Self {
        self.nullable.insert(field.into());
        self
    }

    /// Mark an `extra` field as expression-bearing.
    #[must_use]
    pub fn expression(mut self, field: impl Into<String>) -> Self {
        self.expressions.insert(field.into());
        self
    }

    #[must_use]
    pub fn is_nullable(&self, field: &str) -> bool {
        self.nullable.contains(field)
    }

    #[must_use]
    pub fn is_expression(&self, field: &str) -> bool {
        self.expressions.contains(field)
    }
}

/// A declaration with every placeholder in `extra` bound for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub extra: Params,
    pub load_options: Params,
    pub save_options: Params,
}

impl ResolvedDeclaration {
    /// The resolved `path` field, when present and a string.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.extra.get("path").and_then(Value::as_str)
    }
}
