//! Core types and functionality for craftline
//!
//! This module forms the foundation of craftline's type system: the error
//! taxonomy shared by every subsystem and the value helpers used to pass
//! configuration, call arguments and volatiles around.
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! - [`CraftlineError`] - Enumerated error types covering all failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! ## `value` - Values and Parameters
//!
//! - [`Params`] - The name → value mapping used for arguments and configuration
//! - Merge helpers ([`recursive_merge`], [`override_merge`]) and dotted-path lookup

pub mod error;
pub mod value;

pub use error::{CraftlineError, ErrorContext, Result, user_friendly_error};
pub use value::{Params, lookup_path, override_merge, parse_loose, recursive_merge, stringify};
