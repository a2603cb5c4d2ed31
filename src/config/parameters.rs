//! Named parameter sets.
//!
//! ```yaml
//! base:
//!   model:
//!     depth: 4
//!     rate: 0.1
//!
//! tuned:
//!   from: [base]
//!   merge: recursive
//!   model:
//!     rate: 0.05
//! ```
//!
//! `from` lists the sets to inherit, applied in order. The set's own keys
//! go on top with `merge`: `recursive` deep-merges mappings, `override`
//! replaces top-level keys. When a name is defined in several files, the
//! entry with the lowest `precedence` wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::layers::yaml_files;
use super::parse_mapping;
use crate::core::{CraftlineError, Params, override_merge, recursive_merge};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    #[default]
    Recursive,
    Override,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default)]
    pub merge: MergeMethod,
    #[serde(default)]
    pub precedence: i64,
    #[serde(flatten)]
    pub values: Params,
}

/// All parameter sets of a project, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ParameterSets {
    sets: BTreeMap<String, ParameterSet>,
}

impl ParameterSets {
    /// Read every YAML file under `dir`. A missing directory yields no sets.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut sets = Self::default();
        if !dir.is_dir() {
            return Ok(sets);
        }
        for path in yaml_files(dir, "**/*")? {
            debug!("loading parameter sets from {}", path.display());
            for (name, entry) in parse_mapping(&path)? {
                let set: ParameterSet = serde_json::from_value(entry)
                    .with_context(|| format!("Invalid parameter set '{}' in {}", name, path.display()))?;
                sets.insert(name, set);
            }
        }
        Ok(sets)
    }

    /// Add a set, keeping the existing one when its precedence value is lower.
    pub fn insert(&mut self, name: impl Into<String>, set: ParameterSet) {
        let name = name.into();
        match self.sets.get(&name) {
            Some(existing) if existing.precedence <= set.precedence => {
                debug!("parameter set '{}' shadowed by lower precedence entry", name);
            }
            _ => {
                self.sets.insert(name, set);
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterSet> {
        self.sets.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The fully expanded mapping of `name`.
    pub fn expand(&self, name: &str) -> Result<Params, CraftlineError> {
        let mut stack = Vec::new();
        self.expand_inner(name, &mut stack)
    }

    fn expand_inner(&self, name: &str, stack: &mut Vec<String>) -> Result<Params, CraftlineError> {
        if stack.iter().any(|seen| seen == name) {
            stack.push(name.to_string());
            return Err(CraftlineError::ConfigError {
                message: format!("cyclic parameter set inheritance: {}", stack.join(" → ")),
            });
        }
        let set = self.sets.get(name).ok_or_else(|| CraftlineError::UnknownParameterSet {
            name: name.to_string(),
        })?;

        stack.push(name.to_string());
        let mut expanded = Params::new();
        for parent in &set.from {
            let inherited = self.expand_inner(parent, stack)?;
            recursive_merge(&mut expanded, &inherited);
        }
        stack.pop();

        match set.merge {
            MergeMethod::Recursive => recursive_merge(&mut expanded, &set.values),
            MergeMethod::Override => override_merge(&mut expanded, &set.values),
        }
        Ok(expanded)
    }
}
