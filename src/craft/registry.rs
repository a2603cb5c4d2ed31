//! Name-indexed crafts available to pipeline definitions.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use super::Craft;

/// Crafts that pipeline definitions may reference by name.
///
/// Registering the same name twice replaces the earlier craft.
#[derive(Debug, Clone, Default)]
pub struct CraftRegistry {
    crafts: BTreeMap<String, Arc<Craft>>,
}

impl CraftRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, craft: impl Into<Arc<Craft>>) -> &mut Self {
        let craft = craft.into();
        if self.crafts.insert(craft.name().to_string(), Arc::clone(&craft)).is_some() {
            warn!("craft '{}' registered twice, keeping the latest", craft.name());
        }
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, craft: impl Into<Arc<Craft>>) -> Self {
        self.register(craft);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Craft>> {
        self.crafts.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.crafts.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.crafts.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crafts.is_empty()
    }
}
