//! craftline CLI entry point
//!
//! The stock binary has no crafts registered, so it can validate a project,
//! inspect its catalog and resolve artifact declarations. Applications that
//! define crafts embed the same CLI through [`craftline::cli::run_with_registry`].
//!
//! - `validate` - Load and check every part of the project
//! - `catalog list` - List declared artifacts
//! - `catalog resolve` - Show an artifact declaration bound to arguments
//! - `run` - Run a pipeline definition

use craftline::cli;
use craftline::core::user_friendly_error;
use craftline::craft::CraftRegistry;

fn main() {
    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli::run_with_registry(&CraftRegistry::new()) {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
}
