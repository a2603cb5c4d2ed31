//! Values passed into and returned from a craft function.

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use super::contract::InputKind;
use crate::core::Params;

/// Resolved inputs of one craft invocation, keyed by requirement name.
///
/// [`get`](Self::get) returns any input. [`artifact`](Self::artifact),
/// [`volatile`](Self::volatile) and [`param`](Self::param) also check that
/// the input was declared with that kind.
#[derive(Debug, Clone, Default)]
pub struct CraftInputs {
    craft: String,
    values: Params,
    kinds: HashMap<String, InputKind>,
}

impl CraftInputs {
    pub(crate) fn new(
        craft: impl Into<String>,
        values: Params,
        kinds: HashMap<String, InputKind>,
    ) -> Self {
        Self {
            craft: craft.into(),
            values,
            kinds,
        }
    }

    /// The raw value of input `name`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| anyhow!("craft '{}' has no input named '{}'", self.craft, name))
    }

    /// Input `name` deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.get(name)?.clone();
        serde_json::from_value(value)
            .with_context(|| format!("input '{}' of craft '{}' has an unexpected shape", name, self.craft))
    }

    /// Artifact input `name`, loaded from the catalog.
    pub fn artifact(&self, name: &str) -> Result<&Value> {
        self.get_kind(name, InputKind::Artifact)
    }

    /// Volatile input `name`, produced earlier in the run.
    pub fn volatile(&self, name: &str) -> Result<&Value> {
        self.get_kind(name, InputKind::Volatile)
    }

    /// Plain parameter `name`.
    pub fn param(&self, name: &str) -> Result<&Value> {
        self.get_kind(name, InputKind::Param)
    }

    fn get_kind(&self, name: &str, kind: InputKind) -> Result<&Value> {
        match self.kinds.get(name) {
            Some(declared) if *declared != kind => bail!(
                "input '{}' of craft '{}' is declared as {}, not {}",
                name,
                self.craft,
                declared,
                kind
            ),
            _ => self.get(name),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

/// Named outputs returned by a craft function.
///
/// Must contain exactly the names the craft declares as produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CraftOutputs {
    values: Params,
}

impl CraftOutputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Add an output by serializing `value`.
    pub fn with_serialized<T: Serialize>(mut self, name: impl Into<String>, value: &T) -> Result<Self> {
        let name = name.into();
        let value = serde_json::to_value(value)
            .with_context(|| format!("output '{name}' cannot be serialized"))?;
        self.values.insert(name, value);
        Ok(self)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub(crate) fn into_params(self) -> Params {
        self.values
    }
}
