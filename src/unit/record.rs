// src/unit/record.rs

//! Units as stored inside a manager's arena.

use std::fmt;

use crate::unit::definition::{StartFn, StopFn, UnitDef};

/// Index of a unit in its manager's arena.
///
/// Only meaningful for the manager that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub(crate) usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered unit (internal).
pub(crate) struct Unit<A> {
    pub name: String,
    /// Direct dependencies by name; resolved lazily by the walker.
    pub deps: Vec<String>,
    pub start: StartFn<A>,
    pub stop: StopFn,
    pub started: bool,
}

impl<A> From<UnitDef<A>> for Unit<A> {
    fn from(def: UnitDef<A>) -> Self {
        Self {
            name: def.name,
            deps: def.deps,
            start: def.start,
            stop: def.stop,
            started: false,
        }
    }
}

impl<A> fmt::Debug for Unit<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}
