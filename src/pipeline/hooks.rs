//! Run hooks for crafts and pipelines.
//!
//! A hook observes a run without taking part in data flow. Pipeline hooks
//! wrap the whole run, craft hooks wrap each invocation of their craft.
//! An error returned from `pre_run` or `post_run` aborts the run like any
//! craft failure. `on_error` is notified of the failure, which is still
//! propagated to the caller.

use super::ExecutionContext;
use crate::core::CraftlineError;

pub trait RunHook: Send + Sync {
    /// Called before `target` starts.
    fn pre_run(&self, _target: &str, _context: &ExecutionContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called after `target` finished successfully.
    fn post_run(&self, _target: &str, _context: &ExecutionContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when `target` failed.
    fn on_error(&self, _target: &str, _error: &CraftlineError) {}
}

/// Logs run boundaries through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook;

impl RunHook for LoggingHook {
    fn pre_run(&self, target: &str, context: &ExecutionContext) -> anyhow::Result<()> {
        tracing::info!("starting '{}' with {} volatile(s) available", target, context.volatiles().len());
        Ok(())
    }

    fn post_run(&self, target: &str, context: &ExecutionContext) -> anyhow::Result<()> {
        tracing::info!(
            "finished '{}' ({} artifact(s) written so far)",
            target,
            context.produced_artifacts().len()
        );
        Ok(())
    }

    fn on_error(&self, target: &str, error: &CraftlineError) {
        match error.subject() {
            Some(subject) if subject != target => {
                tracing::error!("'{}' failed at '{}': {}", target, subject, error);
            }
            _ => tracing::error!("'{}' failed: {}", target, error),
        }
    }
}

pub(crate) fn run_pre(
    hooks: &[std::sync::Arc<dyn RunHook>],
    target: &str,
    context: &ExecutionContext,
) -> crate::core::Result<()> {
    for hook in hooks {
        hook.pre_run(target, context).map_err(|source| hook_error(target, source))?;
    }
    Ok(())
}

pub(crate) fn run_post(
    hooks: &[std::sync::Arc<dyn RunHook>],
    target: &str,
    context: &ExecutionContext,
) -> crate::core::Result<()> {
    for hook in hooks {
        hook.post_run(target, context).map_err(|source| hook_error(target, source))?;
    }
    Ok(())
}

pub(crate) fn notify_error(
    hooks: &[std::sync::Arc<dyn RunHook>],
    target: &str,
    error: &CraftlineError,
) {
    for hook in hooks {
        hook.on_error(target, error);
    }
}

fn hook_error(target: &str, source: anyhow::Error) -> CraftlineError {
    CraftlineError::CraftFailed {
        craft: target.to_string(),
        source: source.context("run hook failed"),
    }
}
