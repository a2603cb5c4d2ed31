//! craftline - declarative data pipelines over an artifact catalog
//!
//! craftline separates *what* a pipeline step works on from *where* that
//! data lives. Steps ("crafts") name the artifacts they read and write; a
//! YAML catalog maps each artifact name to a storage type and a location
//! template; pipelines are assembled from crafts by matching what one
//! produces to what another requires.
//!
//! # Architecture Overview
//!
//! - A **catalog** holds artifact declarations. Their fields may contain
//!   placeholders bound from static configuration (`{{ db.host }}`),
//!   call-time arguments (`!{ region }`) or small expressions
//!   (`+{ regions['!{ zone }'] }+`).
//! - A **craft** wraps a function with a contract listing required
//!   artifacts, volatiles and parameters, and produced artifacts and
//!   volatiles. Artifacts are persisted through the catalog, volatiles only
//!   live in the running pipeline's memory.
//! - A **pipeline** is a set of crafts ordered by their data dependencies.
//!   Pipelines compose with [`pipeline::combine`].
//!
//! # Core Modules
//!
//! - [`core`] - Error types, user-facing error context and value helpers
//! - [`interpolation`] - Placeholder parsing, resolution and expression evaluation
//! - [`catalog`] - Artifact declarations, adapters and storage backends
//! - [`craft`] - Crafts, their contracts and the craft registry
//! - [`pipeline`] - Dependency graph, composition, hooks and execution
//! - [`config`] - Project manifest and the YAML files it points at
//! - [`session`] - A loaded project
//! - [`cli`] - The `craftline` command-line interface
//!
//! # Project Layout (craftline.toml)
//!
//! ```toml
//! [project]
//! name = "sales-forecast"
//!
//! [paths]
//! catalog = "lib/catalog"
//! data = "data"
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use craftline::catalog::{ArtifactDeclaration, Catalog};
//! use craftline::craft::{Craft, CraftOutputs};
//! use craftline::interpolation::StaticConfig;
//! use craftline::pipeline::{Pipeline, combine};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut catalog = Catalog::new(StaticConfig::default(), "data");
//! catalog.insert(ArtifactDeclaration::new("numbers", "json").with_extra("path", "numbers_!{ n }.json"))?;
//!
//! let build = Craft::builder("build")
//!     .param("n")
//!     .produces_artifact("numbers")
//!     .build(|inputs| {
//!         let n: u64 = inputs.get_as("n")?;
//!         Ok(CraftOutputs::new().with("numbers", json!((0..n).collect::<Vec<_>>())))
//!     })?;
//! let total = Craft::builder("total")
//!     .artifact("numbers")
//!     .produces_volatile("sum")
//!     .build(|inputs| {
//!         let numbers: Vec<u64> = inputs.get_as("numbers")?;
//!         Ok(CraftOutputs::new().with("sum", numbers.iter().sum::<u64>()))
//!     })?;
//!
//! let pipeline = combine(&Pipeline::from_craft(total), &Pipeline::from_craft(build))?;
//! let outcome = pipeline.run(&catalog, json!({"n": 5}).as_object().unwrap_or(&Default::default()))?;
//! assert_eq!(outcome.volatiles["sum"], json!(10));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod craft;
pub mod interpolation;
pub mod pipeline;
pub mod session;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
