//! Error handling for craftline
//!
//! This module provides the error taxonomy for the interpolation engine, the
//! catalog, and the pipeline compiler, together with user-friendly error
//! reporting for the CLI. The error system is built around two principles:
//! 1. **Strongly-typed errors** so callers can match on precise failure modes
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`CraftlineError`] - Enumerated error types for every failure case
//! - [`ErrorContext`] - Wrapper that adds suggestions and details for display
//!
//! # Error Categories
//!
//! - **Interpolation**: [`CraftlineError::Syntax`], [`CraftlineError::UnresolvedStatic`],
//!   [`CraftlineError::UnresolvedDynamic`], [`CraftlineError::ExpressionResolution`]
//! - **Catalog**: [`CraftlineError::UnknownArtifact`], [`CraftlineError::Adapter`],
//!   [`CraftlineError::UnknownAdapter`], [`CraftlineError::UnknownBackend`]
//! - **Pipeline construction**: [`CraftlineError::AmbiguousProducer`],
//!   [`CraftlineError::CyclicDependency`], [`CraftlineError::DuplicateCraft`],
//!   [`CraftlineError::DuplicateOutput`]
//! - **Execution**: [`CraftlineError::MissingParameter`], [`CraftlineError::UnresolvedVolatile`],
//!   [`CraftlineError::VolatileCollision`], [`CraftlineError::CraftFailed`],
//!   [`CraftlineError::OutputMismatch`]
//! - **Configuration**: [`CraftlineError::ManifestNotFound`], [`CraftlineError::ConfigError`], etc.
//!
//! None of these errors are retried. A pipeline run stops at the first one.
//!
//! # Examples
//!
//! ```rust,no_run
//! use craftline::core::{CraftlineError, user_friendly_error};
//!
//! fn lookup() -> Result<(), CraftlineError> {
//!     Err(CraftlineError::UnknownArtifact {
//!         name: "sales".to_string(),
//!         suggestion: Some("sale".to_string()),
//!     })
//! }
//!
//! if let Err(e) = lookup() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = CraftlineError> = std::result::Result<T, E>;

/// The main error type for craftline operations
///
/// Every resolution error names the artifact or craft it came from, and the
/// key or path that could not be resolved, so failures are diagnosable
/// without inspecting the whole pipeline.
#[derive(Error, Debug)]
pub enum CraftlineError {
    /// A placeholder delimiter is unbalanced or a placeholder body is empty
    #[error("Malformed placeholder in '{input}' at position {position}: {reason}")]
    Syntax {
        /// The string being parsed
        input: String,
        /// Byte offset of the offending delimiter
        position: usize,
        /// What went wrong
        reason: String,
    },

    /// A static placeholder path is absent from both configuration layers
    #[error("Unresolved static placeholder '{{{{ {path} }}}}' in artifact '{artifact}'")]
    UnresolvedStatic {
        /// The dotted path that was looked up
        path: String,
        /// The declaration containing the placeholder
        artifact: String,
    },

    /// A dynamic placeholder has no matching call-time argument
    #[error("Unresolved dynamic placeholder '!{{ {name} }}' in artifact '{artifact}'")]
    UnresolvedDynamic {
        /// The argument name that was looked up
        name: String,
        /// The declaration containing the placeholder
        artifact: String,
    },

    /// An expression placeholder could not be evaluated
    #[error("Cannot evaluate expression '+{{ {expression} }}+': {reason}")]
    ExpressionResolution {
        /// The expression body
        expression: String,
        /// Why evaluation failed
        reason: String,
    },

    /// The catalog has no declaration with this name
    #[error("Unknown artifact '{name}'")]
    UnknownArtifact {
        /// The requested artifact name
        name: String,
        /// The closest known artifact name, if any
        suggestion: Option<String>,
    },

    /// Two crafts in one pipeline produce the same name
    #[error("'{name}' is produced by both '{first}' and '{second}'")]
    AmbiguousProducer {
        /// The artifact or volatile name
        name: String,
        /// The craft registered first
        first: String,
        /// The craft registered second
        second: String,
    },

    /// Producer/consumer edges form a cycle
    #[error("Cyclic dependency between crafts: {}", .crafts.join(" → "))]
    CyclicDependency {
        /// The crafts on the cycle, with the first repeated at the end
        crafts: Vec<String>,
    },

    /// A plain parameter has no value and no default
    #[error("Craft '{craft}' is missing parameter '{param}'")]
    MissingParameter {
        /// The craft being invoked
        craft: String,
        /// The parameter name
        param: String,
    },

    /// A required volatile was not produced earlier in the run
    #[error("Craft '{craft}' requires volatile '{name}' which no earlier craft produced")]
    UnresolvedVolatile {
        /// The craft being invoked
        craft: String,
        /// The volatile name
        name: String,
    },

    /// A volatile output would overwrite an existing value
    #[error("Craft '{craft}' would overwrite existing volatile '{name}'")]
    VolatileCollision {
        /// The craft producing the volatile
        craft: String,
        /// The volatile name
        name: String,
    },

    /// An adapter failed while loading or saving an artifact
    #[error("Adapter '{artifact_type}' failed for artifact '{artifact}'")]
    Adapter {
        /// The artifact name
        artifact: String,
        /// The declared artifact type
        artifact_type: String,
        /// The underlying adapter error
        #[source]
        source: anyhow::Error,
    },

    /// A craft's own function returned an error
    #[error("Craft '{craft}' failed")]
    CraftFailed {
        /// The craft name
        craft: String,
        /// The error returned by the function
        #[source]
        source: anyhow::Error,
    },

    /// A craft returned outputs that do not match its declaration
    #[error("Craft '{craft}' returned outputs that do not match its declaration: {reason}")]
    OutputMismatch {
        /// The craft name
        craft: String,
        /// Which names were missing or unexpected
        reason: String,
    },

    /// Two distinct crafts share a name inside one pipeline
    #[error("Pipeline already contains a different craft named '{name}'")]
    DuplicateCraft {
        /// The clashing craft name
        name: String,
    },

    /// A craft declares the same output name twice
    #[error("Craft '{craft}' declares output '{name}' more than once")]
    DuplicateOutput {
        /// The craft being declared
        craft: String,
        /// The repeated output name
        name: String,
    },

    /// A namespaced parameter block is not a mapping
    #[error("Parameters for craft '{craft}' must be a mapping")]
    InvalidNamespacedParams {
        /// The craft name used as the namespace key
        craft: String,
    },

    /// No adapter is registered for an artifact type
    #[error("No adapter registered for type '{artifact_type}' (artifact '{artifact}')")]
    UnknownAdapter {
        /// The artifact name
        artifact: String,
        /// The declared type
        artifact_type: String,
    },

    /// No backend is registered for a location scheme
    #[error("No backend registered for scheme '{scheme}' in '{location}'")]
    UnknownBackend {
        /// The URI scheme
        scheme: String,
        /// The full location
        location: String,
    },

    /// A parameter set reference cannot be found
    #[error("Unknown parameter set '{name}'")]
    UnknownParameterSet {
        /// The requested set
        name: String,
    },

    /// A pipeline definition cannot be found
    #[error("Unknown pipeline '{name}'")]
    UnknownPipeline {
        /// The requested pipeline
        name: String,
    },

    /// A pipeline operator is neither a pipeline nor a registered craft
    #[error("Pipeline '{pipeline}' references unknown craft '{name}'")]
    UnknownCraft {
        /// The pipeline definition
        pipeline: String,
        /// The operator name
        name: String,
    },

    /// No craftline.toml was found
    #[error("No craftline.toml found in current directory or any parent directory")]
    ManifestNotFound,

    /// Project configuration is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl CraftlineError {
    /// The craft or artifact the error is attributed to, when there is one.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::UnresolvedStatic { artifact, .. }
            | Self::UnresolvedDynamic { artifact, .. }
            | Self::Adapter { artifact, .. }
            | Self::UnknownAdapter { artifact, .. } => Some(artifact),
            Self::UnknownArtifact { name, .. } => Some(name),
            Self::MissingParameter { craft, .. }
            | Self::UnresolvedVolatile { craft, .. }
            | Self::VolatileCollision { craft, .. }
            | Self::CraftFailed { craft, .. }
            | Self::OutputMismatch { craft, .. }
            | Self::DuplicateOutput { craft, .. }
            | Self::InvalidNamespacedParams { craft } => Some(craft),
            _ => None,
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Suggestions are actionable steps displayed in green, details are
/// explanatory text displayed in yellow.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CraftlineError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: CraftlineError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with suggestions
///
/// Known [`CraftlineError`] variants are mapped to tailored suggestions. Any
/// other error is reported with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if error.downcast_ref::<CraftlineError>().is_some() {
        return match error.downcast::<CraftlineError>() {
            Ok(err) => create_error_context(err),
            Err(e) => generic_context(&e),
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::NotFound
    {
        return ErrorContext::new(CraftlineError::Other {
            message: chain_message(&error),
        })
        .with_suggestion("Check that the file or directory exists and the path is spelled correctly")
        .with_details("Relative artifact paths are resolved from the project's data directory");
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(CraftlineError::ConfigError {
            message: chain_message(&error),
        })
        .with_suggestion("Check the TOML syntax in craftline.toml. Verify quotes, brackets, and key names");
    }

    if error.downcast_ref::<serde_yaml::Error>().is_some() {
        return ErrorContext::new(CraftlineError::ConfigError {
            message: chain_message(&error),
        })
        .with_suggestion("Check the YAML syntax and indentation of the file named above");
    }

    generic_context(&error)
}

fn chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn generic_context(error: &anyhow::Error) -> ErrorContext {
    ErrorContext::new(CraftlineError::Other {
        message: chain_message(error),
    })
}

/// Map each [`CraftlineError`] variant to a tailored [`ErrorContext`].
fn create_error_context(error: CraftlineError) -> ErrorContext {
    let suggestion: Option<String> = match &error {
        CraftlineError::Syntax { .. } => Some(
            "Placeholders use '{{ path }}' for configuration, '!{ name }' for call-time arguments and '+{ expr }+' for expressions".to_string(),
        ),
        CraftlineError::UnresolvedStatic { path, .. } => Some(format!(
            "Define '{path}' in a globals*.yaml or locals*.yaml file of the configuration directory"
        )),
        CraftlineError::UnresolvedDynamic { name, .. } => Some(format!(
            "Pass '{name}' as an argument (e.g. --arg {name}=...) or list the field under 'nullable'"
        )),
        CraftlineError::UnknownArtifact { suggestion: Some(close), .. } => {
            Some(format!("Did you mean '{close}'?"))
        }
        CraftlineError::UnknownArtifact { .. } => {
            Some("Run 'craftline catalog list' to see the declared artifacts".to_string())
        }
        CraftlineError::AmbiguousProducer { name, .. } => Some(format!(
            "Keep a single producer of '{name}' in the pipeline, or rename one of the outputs"
        )),
        CraftlineError::CyclicDependency { .. } => {
            Some("Break the cycle by removing one of the inputs or outputs on the path".to_string())
        }
        CraftlineError::MissingParameter { craft, param } => Some(format!(
            "Pass '{param}' as a shared argument, or under the '{craft}' namespace, or give it a default"
        )),
        CraftlineError::UnresolvedVolatile { name, .. } => Some(format!(
            "Add a craft producing volatile '{name}' to the pipeline"
        )),
        CraftlineError::VolatileCollision { name, .. } => Some(format!(
            "Rename one of the volatile outputs named '{name}'"
        )),
        CraftlineError::UnknownAdapter { .. } => Some(
            "Built-in types are json, yaml, toml and text. Register custom adapters on the catalog".to_string(),
        ),
        CraftlineError::UnknownBackend { .. } => Some(
            "Use a plain path, file:// or memory://, or register a backend for this scheme".to_string(),
        ),
        CraftlineError::UnknownCraft { .. } => Some(
            "Register the craft in the CraftRegistry passed to the CLI, or fix the operator name".to_string(),
        ),
        CraftlineError::ManifestNotFound => Some(
            "Create a craftline.toml file at the project root, or pass --manifest-path".to_string(),
        ),
        _ => None,
    };

    let details: Option<String> = match &error {
        CraftlineError::Adapter { source, .. } | CraftlineError::CraftFailed { source, .. } => {
            Some(format!("{source:#}"))
        }
        CraftlineError::ExpressionResolution { .. } => Some(
            "Expressions are re-evaluated until their text stops changing, up to a fixed number of rounds"
                .to_string(),
        ),
        CraftlineError::AmbiguousProducer { .. } | CraftlineError::CyclicDependency { .. } => {
            Some("Pipeline construction failed before any craft was executed".to_string())
        }
        CraftlineError::DuplicateOutput { .. } => {
            Some("Each output name may be declared once per craft".to_string())
        }
        CraftlineError::ManifestNotFound => Some(
            "craftline looks for craftline.toml in the current directory and parent directories"
                .to_string(),
        ),
        _ => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    ctx
}
