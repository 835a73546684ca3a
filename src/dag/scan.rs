// src/dag/scan.rs

//! Fixed-point scan over pending units.
//!
//! Each pass walks the pending list once, in registration order, and attempts
//! every unit whose dependencies have all started. A unit started early in a
//! pass can unblock units later in the same pass. A pass that starts nothing
//! means the remaining units can never start.

use tracing::trace;

use crate::dag::DagGraph;
use crate::errors::{InitdagError, Result};
use crate::unit::UnitId;

/// Readiness of a single pending unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Waiting,
}

/// How a scan ended when no defect was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every pending unit started.
    Completed,
    /// This unit's attempt failed; the scan stopped right there.
    Failed(UnitId),
}

/// What the scan needs to know about the units it drives.
pub trait ScanTarget {
    fn name_of(&self, id: UnitId) -> &str;

    fn deps_of(&self, id: UnitId) -> &[String];

    fn lookup(&self, name: &str) -> Option<UnitId>;

    fn is_started(&self, id: UnitId) -> bool;

    /// Try to start the unit. `true` means it is now started.
    fn attempt(&mut self, id: UnitId) -> bool;
}

/// Dependencies are checked in declaration order; the first one that is not
/// registered at all is a defect, the first one not yet started makes the
/// unit wait.
pub fn readiness<T: ScanTarget + ?Sized>(target: &T, id: UnitId) -> Result<Readiness> {
    for dep in target.deps_of(id) {
        let dep_id = target
            .lookup(dep)
            .ok_or_else(|| InitdagError::UnresolvedDependency {
                unit: target.name_of(id).to_string(),
                dependency: dep.clone(),
            })?;

        if !target.is_started(dep_id) {
            return Ok(Readiness::Waiting);
        }
    }
    Ok(Readiness::Ready)
}

/// Drive `pending` to empty, or stop at the first failed attempt.
///
/// Started units are removed from `pending`; on failure and on error the
/// remaining ids are left in place.
pub fn drive<T: ScanTarget + ?Sized>(target: &mut T, pending: &mut Vec<UnitId>) -> Result<ScanOutcome> {
    let mut pass = 0usize;

    while !pending.is_empty() {
        pass += 1;
        let mut progressed = false;
        let mut i = 0;

        while i < pending.len() {
            let id = pending[i];
            if readiness(&*target, id)? == Readiness::Waiting {
                i += 1;
                continue;
            }

            if !target.attempt(id) {
                return Ok(ScanOutcome::Failed(id));
            }

            pending.remove(i);
            progressed = true;
        }

        trace!(pass, remaining = pending.len(), "scan pass finished");

        if !progressed {
            return Err(stalled(&*target, pending));
        }
    }

    Ok(ScanOutcome::Completed)
}

/// Explain why no pending unit could start.
fn stalled<T: ScanTarget + ?Sized>(target: &T, pending: &[UnitId]) -> InitdagError {
    // A dependency hidden behind a not-yet-started one is only seen here.
    for &id in pending {
        if let Some(dep) = target.deps_of(id).iter().find(|dep| target.lookup(dep).is_none()) {
            return InitdagError::UnresolvedDependency {
                unit: target.name_of(id).to_string(),
                dependency: dep.clone(),
            };
        }
    }

    let graph = DagGraph::from_units(
        pending
            .iter()
            .map(|&id| (target.name_of(id), target.deps_of(id))),
    );

    if let Some(unit) = graph.first_self_dependent() {
        return InitdagError::SelfDependency(unit.to_string());
    }

    let units = graph
        .find_cycle()
        .unwrap_or_else(|| pending.iter().map(|&id| target.name_of(id).to_string()).collect());

    InitdagError::DependencyCycle { units }
}
