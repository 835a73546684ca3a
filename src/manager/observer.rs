// src/manager/observer.rs

//! Observation hooks invoked in-line during the walk.
//!
//! Hooks are pure notifications. A panicking hook is caught and logged so it
//! can never change the outcome of a walk.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{info, warn};

/// Receives lifecycle notifications for each attempted unit.
///
/// All methods default to no-ops, so implementors only override what they
/// care about.
///
/// Hooks run while the walk holds the manager lock. A hook may still call
/// back into its manager: `started_order`, `pending_units`, `contains` and
/// `len` answer from the walk's progress, `validate` and `plan` return
/// `InitdagError::Busy`, `run` and `register` are rejected, and `teardown`
/// does nothing.
pub trait Observer: Send + Sync {
    /// Called immediately before a unit's start action runs.
    fn on_begin(&self, _name: &str) {}

    /// Called immediately after a start action succeeded.
    fn on_success(&self, _name: &str) {}

    /// Called immediately after a start action failed.
    fn on_error(&self, _name: &str, _error: &anyhow::Error) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Observer that reports every notification through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    subsystem: String,
}

impl TracingObserver {
    pub fn new(subsystem: impl Into<String>) -> Self {
        Self {
            subsystem: subsystem.into(),
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("initdag")
    }
}

impl Observer for TracingObserver {
    fn on_begin(&self, name: &str) {
        info!(subsystem = %self.subsystem, unit = %name, "starting unit");
    }

    fn on_success(&self, name: &str) {
        info!(subsystem = %self.subsystem, unit = %name, "unit started");
    }

    fn on_error(&self, name: &str, error: &anyhow::Error) {
        warn!(
            subsystem = %self.subsystem,
            unit = %name,
            error = %format!("{error:#}"),
            "unit failed to start"
        );
    }
}

impl<O: Observer + ?Sized> Observer for Arc<O> {
    fn on_begin(&self, name: &str) {
        (**self).on_begin(name)
    }

    fn on_success(&self, name: &str) {
        (**self).on_success(name)
    }

    fn on_error(&self, name: &str, error: &anyhow::Error) {
        (**self).on_error(name, error)
    }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn on_begin(&self, name: &str) {
        (**self).on_begin(name)
    }

    fn on_success(&self, name: &str) {
        (**self).on_success(name)
    }

    fn on_error(&self, name: &str, error: &anyhow::Error) {
        (**self).on_error(name, error)
    }
}

/// Run a hook, swallowing any panic it raises.
pub(crate) fn guarded<F: FnOnce()>(hook: &'static str, unit: &str, f: F) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!(hook, unit = %unit, "observer hook panicked; ignoring");
    }
}
