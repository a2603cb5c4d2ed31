//! Pipeline definitions.
//!
//! ```yaml
//! preprocessing:
//!   operators: [clean, split]
//!
//! training:
//!   operators: [preprocessing, fit, evaluate]
//! ```
//!
//! An operator names either another definition, which is built and folded
//! in, or a craft from the [`CraftRegistry`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::layers::yaml_files;
use super::parse_mapping;
use crate::core::CraftlineError;
use crate::craft::CraftRegistry;
use crate::pipeline::{Pipeline, combine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub operators: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineDefinitions {
    definitions: BTreeMap<String, PipelineDefinition>,
}

impl PipelineDefinitions {
    /// Read every YAML file under `dir`. A missing directory yields no definitions.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut definitions = Self::default();
        if !dir.is_dir() {
            return Ok(definitions);
        }
        for path in yaml_files(dir, "**/*")? {
            debug!("loading pipeline definitions from {}", path.display());
            for (name, entry) in parse_mapping(&path)? {
                let definition: PipelineDefinition = serde_json::from_value(entry)
                    .with_context(|| format!("Invalid pipeline '{}' in {}", name, path.display()))?;
                if definitions.definitions.contains_key(&name) {
                    return Err(CraftlineError::ConfigError {
                        message: format!("pipeline '{name}' is defined more than once"),
                    }
                    .into());
                }
                definitions.definitions.insert(name, definition);
            }
        }
        Ok(definitions)
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: PipelineDefinition) {
        self.definitions.insert(name.into(), definition);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PipelineDefinition> {
        self.definitions.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Build the pipeline `name`, resolving crafts through `registry`.
    pub fn build(&self, name: &str, registry: &CraftRegistry) -> Result<Pipeline, CraftlineError> {
        let mut stack = Vec::new();
        self.build_inner(name, registry, &mut stack)
    }

    fn build_inner(
        &self,
        name: &str,
        registry: &CraftRegistry,
        stack: &mut Vec<String>,
    ) -> Result<Pipeline, CraftlineError> {
        if let Some(start) = stack.iter().position(|seen| seen == name) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(name.to_string());
            return Err(CraftlineError::CyclicDependency { crafts: cycle });
        }
        let definition = self.definitions.get(name).ok_or_else(|| CraftlineError::UnknownPipeline {
            name: name.to_string(),
        })?;

        stack.push(name.to_string());
        let mut pipeline = Pipeline::new(name);
        for operator in &definition.operators {
            let operand = if self.definitions.contains_key(operator) {
                self.build_inner(operator, registry, stack)?
            } else {
                let craft = registry.get(operator).ok_or_else(|| CraftlineError::UnknownCraft {
                    pipeline: name.to_string(),
                    name: operator.clone(),
                })?;
                Pipeline::from_craft(craft)
            };
            pipeline = combine(&pipeline, &operand)?;
        }
        stack.pop();

        debug!("built pipeline '{}': {:?}", name, pipeline.order());
        Ok(pipeline)
    }
}
