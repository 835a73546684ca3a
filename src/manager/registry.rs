// src/manager/registry.rs

//! Arena of registered units plus the pending and started bookkeeping.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::dag::DagGraph;
use crate::errors::{InitdagError, Result};
use crate::unit::{Unit, UnitDef, UnitId};

/// All mutable manager state; lives behind the manager lock.
#[derive(Debug)]
pub(crate) struct Registry<A> {
    units: Vec<Unit<A>>,
    index: HashMap<String, UnitId>,
    /// Units not started yet, in registration order.
    pub pending: Vec<UnitId>,
    /// Started units, most recently started first.
    pub started_order: VecDeque<UnitId>,
}

impl<A> Registry<A> {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            index: HashMap::new(),
            pending: Vec::new(),
            started_order: VecDeque::new(),
        }
    }

    /// Add a unit. The uniqueness check and the insert happen under the same
    /// `&mut` borrow, so they are atomic with respect to the manager lock.
    pub fn insert(&mut self, def: UnitDef<A>) -> Result<UnitId> {
        if self.index.contains_key(&def.name) {
            return Err(InitdagError::DuplicateUnit(def.name));
        }

        let id = UnitId(self.units.len());
        debug!(unit = %def.name, %id, deps = ?def.deps, "registered unit");

        self.index.insert(def.name.clone(), id);
        self.units.push(Unit::from(def));
        self.pending.push(id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn lookup(&self, name: &str) -> Option<UnitId> {
        self.index.get(name).copied()
    }

    pub fn unit(&self, id: UnitId) -> &Unit<A> {
        &self.units[id.0]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit<A> {
        &mut self.units[id.0]
    }

    pub fn name_of(&self, id: UnitId) -> &str {
        &self.units[id.0].name
    }

    /// Every unit name, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.units.iter().map(|unit| unit.name.clone()).collect()
    }

    pub fn names_of<'a>(&'a self, ids: impl IntoIterator<Item = &'a UnitId>) -> Vec<String> {
        ids.into_iter().map(|&id| self.name_of(id).to_string()).collect()
    }

    /// Whole-graph snapshot in registration order.
    pub fn graph(&self) -> DagGraph {
        DagGraph::from_units(
            self.units
                .iter()
                .map(|unit| (unit.name.as_str(), unit.deps.as_slice())),
        )
    }
}
