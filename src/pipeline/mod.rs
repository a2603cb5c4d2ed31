//! Pipeline compiler and execution engine
//!
//! A [`Pipeline`] is a set of crafts plus the order they run in. The order is
//! derived from the crafts' contracts by [`CraftGraph`]: a craft runs after
//! every craft producing something it requires.
//!
//! # Composition
//!
//! [`combine`] merges two pipelines into a new one whose members are the
//! union of both, left operand's crafts first. Membership is associative:
//! `combine(combine(a, b), c)` and `combine(a, combine(b, c))` hold the same
//! crafts, and only the tie-break order between unrelated crafts may differ.
//! Construction fails fast, before anything runs, on
//! [`CraftlineError::AmbiguousProducer`] and [`CraftlineError::CyclicDependency`].
//!
//! # Execution
//!
//! [`Pipeline::run`] partitions the call arguments into shared and
//! namespaced parameters (a key equal to a craft name holds that craft's
//! parameters), runs every craft in order against one fresh
//! [`ExecutionContext`], and returns the volatiles and the artifacts written.
//! Execution is sequential and the first failure aborts the run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use craftline::craft::{Craft, CraftOutputs};
//! use craftline::pipeline::{Pipeline, combine};
//! use serde_json::json;
//!
//! # fn example(catalog: &craftline::catalog::Catalog) -> craftline::core::Result<()> {
//! let build = Craft::builder("build")
//!     .param_with_default("n", 500)
//!     .produces_artifact("data")
//!     .build(|inputs| Ok(CraftOutputs::new().with("data", inputs.get("n")?.clone())))?;
//! let train = Craft::builder("train")
//!     .artifact("data")
//!     .produces_volatile("model")
//!     .build(|inputs| Ok(CraftOutputs::new().with("model", inputs.get("data")?.clone())))?;
//!
//! let pipeline = combine(&Pipeline::from_craft(train), &Pipeline::from_craft(build))?;
//! let args = json!({"n": 10}).as_object().cloned().unwrap_or_default();
//! let outcome = pipeline.run(catalog, &args)?;
//! assert_eq!(outcome.volatiles["model"], json!(10));
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod graph;
pub mod hooks;

pub use context::{ExecutionContext, RunOutcome};
pub use graph::CraftGraph;
pub use hooks::{LoggingHook, RunHook};

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::catalog::Catalog;
use crate::core::{CraftlineError, Params, Result};
use crate::craft::Craft;

/// A dependency-ordered collection of crafts run as one unit.
#[derive(Clone)]
pub struct Pipeline {
    name: String,
    crafts: Vec<Arc<Craft>>,
    order: Vec<usize>,
    hooks: Vec<Arc<dyn RunHook>>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crafts: Vec::new(),
            order: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// A pipeline holding a single craft, named after it.
    pub fn from_craft(craft: impl Into<Arc<Craft>>) -> Self {
        let craft = craft.into();
        Self {
            name: craft.name().to_string(),
            crafts: vec![craft],
            order: vec![0],
            hooks: Vec::new(),
        }
    }

    /// A pipeline holding `crafts`, in that insertion order.
    pub fn from_crafts(
        name: impl Into<String>,
        crafts: impl IntoIterator<Item = Arc<Craft>>,
    ) -> Result<Self> {
        let mut pipeline = Self::new(name);
        for craft in crafts {
            pipeline.push(craft)?;
        }
        pipeline.recompute()?;
        Ok(pipeline)
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn RunHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.crafts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crafts.is_empty()
    }

    /// Craft names as a set.
    #[must_use]
    pub fn members(&self) -> BTreeSet<String> {
        self.crafts.iter().map(|c| c.name().to_string()).collect()
    }

    /// Craft names in execution order.
    #[must_use]
    pub fn order(&self) -> Vec<&str> {
        self.ordered().map(|c| c.name()).collect()
    }

    /// Crafts in execution order.
    pub fn ordered(&self) -> impl Iterator<Item = &Arc<Craft>> {
        self.order.iter().map(|&i| &self.crafts[i])
    }

    /// The dependency graph of the current members.
    pub fn graph(&self) -> Result<CraftGraph> {
        CraftGraph::build(&self.crafts)
    }

    /// Graphviz DOT source of the dependency graph.
    pub fn to_dot(&self) -> Result<String> {
        Ok(self.graph()?.to_dot())
    }

    /// A new pipeline with `other`'s crafts added after this one's.
    pub fn combine(&self, other: &Self) -> Result<Self> {
        combine(self, other)
    }

    /// Add `craft` unless this exact craft is already a member.
    fn push(&mut self, craft: Arc<Craft>) -> Result<()> {
        match self.crafts.iter().find(|existing| existing.name() == craft.name()) {
            Some(existing) if Arc::ptr_eq(existing, &craft) => Ok(()),
            Some(_) => Err(CraftlineError::DuplicateCraft {
                name: craft.name().to_string(),
            }),
            None => {
                self.crafts.push(craft);
                Ok(())
            }
        }
    }

    fn recompute(&mut self) -> Result<()> {
        self.order = CraftGraph::build(&self.crafts)?.topological_order()?;
        Ok(())
    }

    /// Run every craft in order against one fresh context.
    pub fn run(&self, catalog: &Catalog, args: &Params) -> Result<RunOutcome> {
        let names: HashSet<&str> = self.crafts.iter().map(|c| c.name()).collect();
        let mut context = ExecutionContext::from_args(args, &names)?;
        let total = self.order.len();

        info!("running pipeline '{}' ({} crafts)", self.name, total);
        hooks::run_pre(&self.hooks, &self.name, &context)?;

        for (done, craft) in self.ordered().enumerate() {
            info!("running craft '{}'", craft.name());
            if let Err(e) = craft.invoke(&mut context, catalog, &Params::new()) {
                hooks::notify_error(&self.hooks, &self.name, &e);
                return Err(e);
            }
            info!("Completed {} out of {}", done + 1, total);
        }

        hooks::run_post(&self.hooks, &self.name, &context)?;
        Ok(context.into_outcome())
    }
}

impl From<Craft> for Pipeline {
    fn from(craft: Craft) -> Self {
        Self::from_craft(craft)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("order", &self.order())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Combine `left` and `right` into a new pipeline.
///
/// The result keeps `left`'s name and hooks, then appends `right`'s hooks.
/// Crafts shared by identity appear once. Two different crafts with the
/// same name are a [`CraftlineError::DuplicateCraft`] error.
pub fn combine(left: &Pipeline, right: &Pipeline) -> Result<Pipeline> {
    let mut combined = Pipeline::new(left.name.clone());
    for craft in left.ordered().chain(right.ordered()) {
        combined.push(Arc::clone(craft))?;
    }
    combined.hooks = left.hooks.iter().chain(&right.hooks).cloned().collect();
    combined.recompute()?;
    Ok(combined)
}
