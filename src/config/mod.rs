//! Project configuration for craftline
//!
//! A craftline project is a directory holding a `craftline.toml` manifest
//! plus a handful of YAML directories the manifest points at:
//!
//! ```text
//! project/
//! ├── craftline.toml
//! ├── lib/
//! │   ├── configuration/   globals*.yaml, locals*.yaml
//! │   ├── catalog/         artifact declarations
//! │   ├── parameters/      named parameter sets
//! │   └── pipelines/       pipeline definitions
//! └── data/                anchor for relative artifact paths
//! ```
//!
//! # Modules
//!
//! - `manifest` - The `craftline.toml` file and its discovery
//! - `layers` - Static configuration from `globals*` and `locals*` files
//! - `catalog_loader` - Artifact declarations, with the static pass applied
//! - `parameters` - Named parameter sets with inheritance
//! - `pipelines` - Named pipeline definitions built against a craft registry
//! - `parser` - Generic TOML/YAML parsing with file context
//!
//! # Layering
//!
//! Files of the same layer are merged recursively in sorted path order.
//! `locals*` values win over `globals*` values. `locals*` files hold machine-specific
//! settings and usually stay out of version control.

pub mod catalog_loader;
pub mod layers;
pub mod manifest;
pub mod parameters;
pub mod parser;
pub mod pipelines;

pub use catalog_loader::load_catalog;
pub use layers::load_static_config;
pub use manifest::{
    MANIFEST_FILE, PathsSection, ProjectManifest, ProjectSection, find_manifest, find_manifest_from,
    find_manifest_with_optional,
};
pub use parameters::{MergeMethod, ParameterSet, ParameterSets};
pub use parser::{parse_config, parse_mapping};
pub use pipelines::{PipelineDefinition, PipelineDefinitions};
