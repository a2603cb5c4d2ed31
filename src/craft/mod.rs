//! Crafts: functions with an explicit input/output contract
//!
//! A [`Craft`] wraps a function together with a [`CraftContract`] listing the
//! artifacts, volatiles and plain parameters it needs and the artifacts and
//! volatiles it produces. The contract is what the pipeline compiler uses to
//! order crafts, so no wiring code is needed between them.
//!
//! # Invocation
//!
//! Given an [`ExecutionContext`] and explicit overrides, a craft:
//!
//! 1. Builds its argument namespace: param defaults, then shared params,
//!    then its namespaced params, then explicit overrides (later wins).
//! 2. Loads each required artifact from the catalog with that namespace. An
//!    artifact with a default falls back to it when loading fails.
//! 3. Takes each required volatile from the context
//!    ([`CraftlineError::UnresolvedVolatile`] if absent).
//! 4. Takes each plain param from the namespace
//!    ([`CraftlineError::MissingParameter`] if absent and without default).
//! 5. Calls the function.
//! 6. Saves each produced artifact through the catalog.
//! 7. Inserts each produced volatile into the context
//!    ([`CraftlineError::VolatileCollision`] on an existing key).
//!
//! # Examples
//!
//! ```rust,no_run
//! use craftline::craft::{Craft, CraftOutputs};
//! use serde_json::json;
//!
//! # fn example() -> craftline::core::Result<()> {
//! let build = Craft::builder("build")
//!     .param_with_default("n", 500)
//!     .produces_artifact("data")
//!     .build(|inputs| {
//!         let n: u64 = inputs.get_as("n")?;
//!         Ok(CraftOutputs::new().with("data", json!((0..n).collect::<Vec<_>>())))
//!     })?;
//! # Ok(())
//! # }
//! ```

pub mod contract;
pub mod io;
pub mod registry;

pub use contract::{CraftContract, InputKind, OutputKind, Production, Requirement};
pub use io::{CraftInputs, CraftOutputs};
pub use registry::CraftRegistry;

use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::core::{CraftlineError, Params, Result, override_merge};
use crate::pipeline::hooks::{self, RunHook};
use crate::pipeline::{ExecutionContext, RunOutcome};

/// Signature of the function wrapped by a craft.
pub type CraftFn = dyn Fn(&CraftInputs) -> anyhow::Result<CraftOutputs> + Send + Sync;

/// A function bound to its contract.
#[derive(Clone)]
pub struct Craft {
    name: String,
    contract: CraftContract,
    func: Arc<CraftFn>,
    hooks: Vec<Arc<dyn RunHook>>,
}

impl Craft {
    /// Start declaring a craft named `name`.
    pub fn builder(name: impl Into<String>) -> CraftBuilder {
        CraftBuilder {
            name: name.into(),
            contract: CraftContract::default(),
            hooks: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn contract(&self) -> &CraftContract {
        &self.contract
    }

    /// Invoke the craft against a running pipeline's context.
    pub fn invoke(
        &self,
        context: &mut ExecutionContext,
        catalog: &Catalog,
        overrides: &Params,
    ) -> Result<()> {
        hooks::run_pre(&self.hooks, &self.name, context)?;
        match self.invoke_inner(context, catalog, overrides) {
            Ok(()) => hooks::run_post(&self.hooks, &self.name, context),
            Err(e) => {
                hooks::notify_error(&self.hooks, &self.name, &e);
                Err(e)
            }
        }
    }

    /// Call the craft on its own, with `args` as the only argument source.
    pub fn call(&self, catalog: &Catalog, args: &Params) -> Result<RunOutcome> {
        let mut context = ExecutionContext::new();
        self.invoke(&mut context, catalog, args)?;
        Ok(context.into_outcome())
    }

    /// The argument namespace: defaults < shared < namespaced < overrides.
    fn namespace(&self, context: &ExecutionContext, overrides: &Params) -> Params {
        let mut namespace = self.contract.param_defaults();
        override_merge(&mut namespace, context.shared());
        if let Some(scoped) = context.namespaced(&self.name) {
            override_merge(&mut namespace, scoped);
        }
        override_merge(&mut namespace, overrides);
        namespace
    }

    fn invoke_inner(
        &self,
        context: &mut ExecutionContext,
        catalog: &Catalog,
        overrides: &Params,
    ) -> Result<()> {
        let namespace = self.namespace(context, overrides);
        let mut inputs = Params::new();
        let mut kinds = HashMap::new();

        for requirement in &self.contract.required {
            let value = match requirement.kind {
                InputKind::Artifact => match catalog.load(&requirement.name, &namespace) {
                    Ok(value) => value,
                    Err(e) => match &requirement.default {
                        Some(default) => {
                            warn!(
                                "craft '{}' could not load artifact '{}', using its default: {}",
                                self.name, requirement.name, e
                            );
                            default.clone()
                        }
                        None => return Err(e),
                    },
                },
                InputKind::Volatile => context.volatile(&requirement.name).cloned().ok_or_else(
                    || CraftlineError::UnresolvedVolatile {
                        craft: self.name.clone(),
                        name: requirement.name.clone(),
                    },
                )?,
                InputKind::Param => namespace.get(&requirement.name).cloned().ok_or_else(|| {
                    CraftlineError::MissingParameter {
                        craft: self.name.clone(),
                        param: requirement.name.clone(),
                    }
                })?,
            };
            inputs.insert(requirement.name.clone(), value);
            kinds.insert(requirement.name.clone(), requirement.kind);
        }

        debug!("calling craft '{}' with inputs {:?}", self.name, inputs.keys().collect::<Vec<_>>());
        let inputs = CraftInputs::new(self.name.clone(), inputs, kinds);
        let outputs = (self.func)(&inputs).map_err(|source| CraftlineError::CraftFailed {
            craft: self.name.clone(),
            source,
        })?;
        let mut outputs = self.check_outputs(outputs)?;

        for production in self.contract.productions_of(OutputKind::Volatile) {
            context.check_volatile_free(&self.name, &production.name)?;
        }

        for production in &self.contract.produced {
            let value = outputs.remove(&production.name).unwrap_or(Value::Null);
            match production.kind {
                OutputKind::Artifact => {
                    catalog.save(&production.name, &value, &namespace)?;
                    context.record_artifact(&production.name);
                }
                OutputKind::Volatile => {
                    context.insert_volatile(&self.name, &production.name, value)?;
                }
            }
        }

        Ok(())
    }

    /// The returned names must be exactly the declared productions.
    fn check_outputs(&self, outputs: CraftOutputs) -> Result<Params> {
        let returned: BTreeSet<&str> = outputs.names().collect();
        let declared: BTreeSet<&str> = self.contract.produced.iter().map(|p| p.name.as_str()).collect();
        if returned == declared {
            return Ok(outputs.into_params());
        }

        let missing: Vec<&str> = declared.difference(&returned).copied().collect();
        let unexpected: Vec<&str> = returned.difference(&declared).copied().collect();
        let mut reasons = Vec::new();
        if !missing.is_empty() {
            reasons.push(format!("missing {}", missing.join(", ")));
        }
        if !unexpected.is_empty() {
            reasons.push(format!("unexpected {}", unexpected.join(", ")));
        }
        Err(CraftlineError::OutputMismatch {
            craft: self.name.clone(),
            reason: reasons.join("; "),
        })
    }
}

impl fmt::Debug for Craft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Craft")
            .field("name", &self.name)
            .field("contract", &self.contract)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

/// Declares a craft's contract, then binds it to a function.
#[derive(Clone)]
pub struct CraftBuilder {
    name: String,
    contract: CraftContract,
    hooks: Vec<Arc<dyn RunHook>>,
}

impl CraftBuilder {
    fn require(mut self, name: impl Into<String>, kind: InputKind, default: Option<Value>) -> Self {
        self.contract.required.push(Requirement {
            name: name.into(),
            kind,
            default,
        });
        self
    }

    fn produce(mut self, name: impl Into<String>, kind: OutputKind) -> Self {
        self.contract.produced.push(Production {
            name: name.into(),
            kind,
        });
        self
    }

    /// Require a catalog artifact.
    #[must_use]
    pub fn artifact(self, name: impl Into<String>) -> Self {
        self.require(name, InputKind::Artifact, None)
    }

    /// Require a catalog artifact, falling back to `default` when it cannot be loaded.
    #[must_use]
    pub fn artifact_with_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.require(name, InputKind::Artifact, Some(default.into()))
    }

    /// Require a volatile produced earlier in the run.
    #[must_use]
    pub fn volatile(self, name: impl Into<String>) -> Self {
        self.require(name, InputKind::Volatile, None)
    }

    /// Require a plain parameter.
    #[must_use]
    pub fn param(self, name: impl Into<String>) -> Self {
        self.require(name, InputKind::Param, None)
    }

    #[must_use]
    pub fn param_with_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.require(name, InputKind::Param, Some(default.into()))
    }

    /// Declare an artifact persisted through the catalog.
    #[must_use]
    pub fn produces_artifact(self, name: impl Into<String>) -> Self {
        self.produce(name, OutputKind::Artifact)
    }

    /// Declare a volatile kept for later crafts.
    #[must_use]
    pub fn produces_volatile(self, name: impl Into<String>) -> Self {
        self.produce(name, OutputKind::Volatile)
    }

    #[must_use]
    pub fn hook(mut self, hook: Arc<dyn RunHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Bind the contract to `func`.
    ///
    /// Fails with [`CraftlineError::DuplicateOutput`] when a name is declared
    /// as produced more than once.
    pub fn build<F>(self, func: F) -> Result<Craft>
    where
        F: Fn(&CraftInputs) -> anyhow::Result<CraftOutputs> + Send + Sync + 'static,
    {
        let mut seen = HashSet::new();
        for requirement in &self.contract.required {
            if !seen.insert(requirement.name.as_str()) {
                warn!("craft '{}' requires '{}' more than once", self.name, requirement.name);
            }
        }

        let mut seen = HashSet::new();
        for production in &self.contract.produced {
            if !seen.insert(production.name.as_str()) {
                return Err(CraftlineError::DuplicateOutput {
                    craft: self.name,
                    name: production.name.clone(),
                });
            }
        }

        Ok(Craft {
            name: self.name,
            contract: self.contract,
            func: Arc::new(func),
            hooks: self.hooks,
        })
    }
}
