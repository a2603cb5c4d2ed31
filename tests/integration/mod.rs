//! Integration test suite for craftline
//!
//! End-to-end tests over real project directories and the `craftline`
//! binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **interpolation**: Placeholder binding through a loaded catalog
//! - **catalog**: Adapters, backends and artifact round trips
//! - **pipeline**: Composition and execution against real storage
//! - **session**: Project loading, parameter sets and pipeline definitions
//! - **cli**: The `craftline` binary

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod catalog;
mod cli;
mod interpolation;
mod pipeline;
mod session;
