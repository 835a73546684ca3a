// src/manager/progress.rs

//! Names-only view of the walk's bookkeeping.
//!
//! `run` and `teardown` hold the registry lock while start and stop actions
//! run. This view is updated next to the registry and only locked for the
//! length of a copy, so introspection from inside a hook or an action still
//! gets an answer.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::unit::UnitName;

#[derive(Debug, Default)]
struct View {
    /// Every registered unit, in registration order.
    units: Vec<UnitName>,
    /// Units not started yet, in registration order.
    pending: Vec<UnitName>,
    /// Started units, most recently started first.
    started: VecDeque<UnitName>,
}

#[derive(Debug, Default)]
pub(crate) struct Progress(Mutex<View>);

impl Progress {
    fn view(&self) -> MutexGuard<'_, View> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the view at the start of a walk. Registrations are closed by
    /// then, so `units` does not change afterwards.
    pub fn begin(&self, units: Vec<UnitName>, pending: Vec<UnitName>) {
        let mut view = self.view();
        view.units = units;
        view.pending = pending;
        view.started.clear();
    }

    pub fn mark_started(&self, name: &str) {
        let mut view = self.view();
        view.pending.retain(|unit| unit != name);
        view.started.push_front(name.to_string());
    }

    pub fn clear_started(&self) {
        self.view().started.clear();
    }

    pub fn started_order(&self) -> Vec<UnitName> {
        self.view().started.iter().cloned().collect()
    }

    pub fn pending_units(&self) -> Vec<UnitName> {
        self.view().pending.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.view().units.iter().any(|unit| unit == name)
    }

    pub fn len(&self) -> usize {
        self.view().units.len()
    }
}
