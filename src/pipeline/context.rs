//! Per-run execution state.

use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::core::{CraftlineError, Params, Result};

/// Mutable state threaded through one pipeline run.
///
/// Created when a run starts and consumed into a [`RunOutcome`] when it
/// ends, so volatiles never leak between runs.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    shared: Params,
    namespaced: HashMap<String, Params>,
    volatiles: Params,
    produced_artifacts: Vec<String>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split call arguments into shared and namespaced parameters.
    ///
    /// A key equal to a craft name holds that craft's parameters and must be
    /// a mapping. Every other key is shared.
    pub fn from_args(args: &Params, craft_names: &HashSet<&str>) -> Result<Self> {
        let mut context = Self::new();
        for (key, value) in args {
            if craft_names.contains(key.as_str()) {
                let Value::Object(params) = value else {
                    return Err(CraftlineError::InvalidNamespacedParams {
                        craft: key.clone(),
                    });
                };
                context.namespaced.insert(key.clone(), params.clone());
            } else {
                context.shared.insert(key.clone(), value.clone());
            }
        }
        Ok(context)
    }

    #[must_use]
    pub const fn shared(&self) -> &Params {
        &self.shared
    }

    /// Parameters scoped to `craft`, if any were passed.
    #[must_use]
    pub fn namespaced(&self, craft: &str) -> Option<&Params> {
        self.namespaced.get(craft)
    }

    #[must_use]
    pub const fn volatiles(&self) -> &Params {
        &self.volatiles
    }

    #[must_use]
    pub fn volatile(&self, name: &str) -> Option<&Value> {
        self.volatiles.get(name)
    }

    /// Fail if `name` is already present.
    pub fn check_volatile_free(&self, craft: &str, name: &str) -> Result<()> {
        if self.volatiles.contains_key(name) {
            return Err(CraftlineError::VolatileCollision {
                craft: craft.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Insert a volatile, never overwriting an existing one.
    pub fn insert_volatile(&mut self, craft: &str, name: &str, value: Value) -> Result<()> {
        self.check_volatile_free(craft, name)?;
        self.volatiles.insert(name.to_string(), value);
        Ok(())
    }

    pub fn record_artifact(&mut self, name: &str) {
        if !self.produced_artifacts.iter().any(|n| n == name) {
            self.produced_artifacts.push(name.to_string());
        }
    }

    /// Artifact names written during this run, in write order.
    #[must_use]
    pub fn produced_artifacts(&self) -> &[String] {
        &self.produced_artifacts
    }

    #[must_use]
    pub fn into_outcome(self) -> RunOutcome {
        RunOutcome {
            volatiles: self.volatiles,
            artifacts: self.produced_artifacts,
        }
    }
}

/// What a run hands back to its caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunOutcome {
    /// Every volatile produced during the run
    pub volatiles: Params,
    /// Artifacts persisted during the run, in write order
    pub artifacts: Vec<String>,
}
