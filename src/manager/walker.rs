// src/manager/walker.rs

//! The walk: start every pending unit in dependency order, and the unwind
//! that undoes it.

use std::collections::HashSet;
use std::mem;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, info, warn};

use crate::dag::scan::{self, ScanOutcome, ScanTarget};
use crate::errors::Result;
use crate::manager::observer::{Observer, guarded};
use crate::manager::progress::Progress;
use crate::manager::registry::Registry;
use crate::unit::UnitId;

/// A live walk over a registry, running real start actions.
struct Walk<'a, A> {
    registry: &'a mut Registry<A>,
    args: &'a A,
    observer: &'a dyn Observer,
    progress: &'a Progress,
}

impl<A> ScanTarget for Walk<'_, A> {
    fn name_of(&self, id: UnitId) -> &str {
        self.registry.name_of(id)
    }

    fn deps_of(&self, id: UnitId) -> &[String] {
        &self.registry.unit(id).deps
    }

    fn lookup(&self, name: &str) -> Option<UnitId> {
        self.registry.lookup(name)
    }

    fn is_started(&self, id: UnitId) -> bool {
        self.registry.unit(id).started
    }

    fn attempt(&mut self, id: UnitId) -> bool {
        let observer = self.observer;
        let unit = self.registry.unit_mut(id);
        let name = unit.name.clone();

        guarded("on_begin", &name, || observer.on_begin(&name));
        debug!(unit = %name, "running start action");

        match (unit.start)(self.args) {
            Ok(()) => {
                unit.started = true;
                self.registry.started_order.push_front(id);
                self.progress.mark_started(&name);
                guarded("on_success", &name, || observer.on_success(&name));
                true
            }
            Err(err) => {
                warn!(unit = %name, error = %format!("{err:#}"), "start action failed");
                guarded("on_error", &name, || observer.on_error(&name, &err));
                false
            }
        }
    }
}

/// Run the walk over everything pending in `registry`.
///
/// On `ScanOutcome::Failed` nothing has been unwound yet; the caller decides.
pub(crate) fn walk<A>(
    registry: &mut Registry<A>,
    args: &A,
    observer: &dyn Observer,
    progress: &Progress,
) -> Result<ScanOutcome> {
    progress.begin(registry.names(), registry.names_of(&registry.pending));
    let mut pending = mem::take(&mut registry.pending);

    let outcome = {
        let mut walk = Walk {
            registry: &mut *registry,
            args,
            observer,
            progress,
        };
        scan::drive(&mut walk, &mut pending)
    };

    registry.pending = pending;
    outcome
}

/// Stop every started unit, most recently started first, and clear the
/// started order. Returns the names stopped, in stop order.
///
/// Stop actions have no failure channel; a panicking one is logged and the
/// unwind carries on.
pub(crate) fn unwind<A>(registry: &mut Registry<A>, progress: &Progress) -> Vec<String> {
    let started = mem::take(&mut registry.started_order);
    progress.clear_started();
    let mut stopped = Vec::with_capacity(started.len());

    for id in started {
        let unit = registry.unit_mut(id);
        info!(unit = %unit.name, "stopping unit");

        if catch_unwind(AssertUnwindSafe(|| (unit.stop)())).is_err() {
            warn!(unit = %unit.name, "stop action panicked; continuing unwind");
        }

        unit.started = false;
        stopped.push(unit.name.clone());
    }

    stopped
}

/// Dry-run of the walk that assumes every start action succeeds.
struct Simulation<'a, A> {
    registry: &'a Registry<A>,
    started: HashSet<UnitId>,
    order: Vec<UnitId>,
}

impl<A> ScanTarget for Simulation<'_, A> {
    fn name_of(&self, id: UnitId) -> &str {
        self.registry.name_of(id)
    }

    fn deps_of(&self, id: UnitId) -> &[String] {
        &self.registry.unit(id).deps
    }

    fn lookup(&self, name: &str) -> Option<UnitId> {
        self.registry.lookup(name)
    }

    fn is_started(&self, id: UnitId) -> bool {
        self.started.contains(&id) || self.registry.unit(id).started
    }

    fn attempt(&mut self, id: UnitId) -> bool {
        self.started.insert(id);
        self.order.push(id);
        true
    }
}

/// The start order a walk would realize if every unit succeeded.
pub(crate) fn plan<A>(registry: &Registry<A>) -> Result<Vec<String>> {
    let mut pending = registry.pending.clone();
    let mut sim = Simulation {
        registry,
        started: HashSet::new(),
        order: Vec::new(),
    };

    scan::drive(&mut sim, &mut pending)?;
    Ok(registry.names_of(&sim.order))
}
