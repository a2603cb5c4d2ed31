//! A loaded craftline project.
//!
//! [`Session`] bundles everything read from a project directory: the
//! manifest, the layered static configuration (held by the catalog), the
//! catalog itself, the parameter sets and the pipeline definitions. It is
//! created explicitly and passed by reference.
//!
//! ```rust,no_run
//! use craftline::craft::CraftRegistry;
//! use craftline::session::Session;
//!
//! # fn example(registry: &CraftRegistry) -> anyhow::Result<()> {
//! let session = Session::discover(&std::env::current_dir()?)?;
//! let args = session.parameters("default")?;
//! let outcome = session.run_pipeline("training", registry, &args)?;
//! println!("wrote {:?}", outcome.artifacts);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::{
    MANIFEST_FILE, ParameterSets, PipelineDefinitions, ProjectManifest, find_manifest_from,
    load_catalog, load_static_config,
};
use crate::core::{CraftlineError, Params};
use crate::craft::CraftRegistry;
use crate::interpolation::StaticConfig;
use crate::pipeline::{Pipeline, RunOutcome};

#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    manifest: ProjectManifest,
    catalog: Catalog,
    parameters: ParameterSets,
    pipelines: PipelineDefinitions,
}

impl Session {
    /// Load the project whose `craftline.toml` sits directly in `root`.
    pub fn load(root: &Path) -> Result<Self> {
        Self::from_manifest_path(&root.join(MANIFEST_FILE))
    }

    /// Load the project owning `start`, searching upwards for the manifest.
    pub fn discover(start: &Path) -> Result<Self> {
        Self::from_manifest_path(&find_manifest_from(start)?)
    }

    /// Load the project described by the manifest at `manifest_path`.
    pub fn from_manifest_path(manifest_path: &Path) -> Result<Self> {
        if !manifest_path.is_file() {
            return Err(CraftlineError::ManifestNotFound.into());
        }
        let manifest = ProjectManifest::load(manifest_path)?;
        let root = manifest_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        info!("loading project '{}' from {}", manifest.project.name, root.display());

        let paths = &manifest.paths;
        let config = load_static_config(&root.join(&paths.configuration))
            .context("Failed to load static configuration")?;
        let catalog = load_catalog(&root.join(&paths.catalog), config, &root.join(&paths.data))
            .context("Failed to load catalog")?;
        let parameters = ParameterSets::load(&root.join(&paths.parameters))
            .context("Failed to load parameter sets")?;
        let pipelines = PipelineDefinitions::load(&root.join(&paths.pipelines))
            .context("Failed to load pipeline definitions")?;

        debug!(
            "loaded {} artifact(s), {} parameter set(s), {} pipeline(s)",
            catalog.names().count(),
            parameters.len(),
            pipelines.len()
        );

        Ok(Self {
            root,
            manifest,
            catalog,
            parameters,
            pipelines,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    #[must_use]
    pub const fn config(&self) -> &StaticConfig {
        self.catalog.config()
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable access for registering adapters and backends.
    pub const fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    #[must_use]
    pub const fn parameter_sets(&self) -> &ParameterSets {
        &self.parameters
    }

    #[must_use]
    pub const fn pipeline_definitions(&self) -> &PipelineDefinitions {
        &self.pipelines
    }

    /// The expanded parameter set `name`.
    pub fn parameters(&self, name: &str) -> Result<Params, CraftlineError> {
        self.parameters.expand(name)
    }

    /// Build the pipeline definition `name` against `registry`.
    pub fn pipeline(&self, name: &str, registry: &CraftRegistry) -> Result<Pipeline, CraftlineError> {
        self.pipelines.build(name, registry)
    }

    /// Build and run the pipeline definition `name`.
    pub fn run_pipeline(
        &self,
        name: &str,
        registry: &CraftRegistry,
        args: &Params,
    ) -> Result<RunOutcome, CraftlineError> {
        self.pipeline(name, registry)?.run(&self.catalog, args)
    }
}
