// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;

use crate::errors::{InitdagError, Result};

#[derive(Debug, Clone)]
struct DagNode {
    /// Position in registration order.
    position: usize,
    /// Direct dependencies: units that must start before this one.
    deps: Vec<String>,
}

/// Snapshot of a unit graph keyed by unit name.
///
/// Unlike the walker, which resolves dependency names lazily, this view sees
/// the whole graph at once. It backs pre-flight validation, cycle diagnostics
/// and the manifest checks.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    order: Vec<String>,
    nodes: HashMap<String, DagNode>,
}

impl DagGraph {
    /// Build a graph from `(name, deps)` pairs given in registration order.
    ///
    /// Dependencies on names that are not part of the input are kept in the
    /// dependency lists but get no node; [`DagGraph::validate`] reports them.
    pub fn from_units<'a, I>(units: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut graph = DagGraph::default();

        for (name, deps) in units {
            let position = graph.order.len();
            graph.order.push(name.to_string());
            graph.nodes.insert(
                name.to_string(),
                DagNode {
                    position,
                    deps: deps.to_vec(),
                },
            );
        }

        graph
    }

    /// Immediate dependencies of a unit.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// First dependency (in registration order) that names no unit in the
    /// graph, as `(unit, dependency)`.
    pub fn first_unresolved(&self) -> Option<(&str, &str)> {
        self.order.iter().find_map(|unit| {
            self.dependencies_of(unit)
                .iter()
                .find(|dep| !self.nodes.contains_key(dep.as_str()))
                .map(|dep| (unit.as_str(), dep.as_str()))
        })
    }

    /// First unit (in registration order) listing itself as a dependency.
    pub fn first_self_dependent(&self) -> Option<&str> {
        self.order
            .iter()
            .find(|unit| self.dependencies_of(unit).contains(unit))
            .map(String::as_str)
    }

    /// Check the whole graph: every dependency resolves, no unit depends on
    /// itself, and there is no cycle. Checked in that order, the same order
    /// a stalled walk uses to explain itself.
    pub fn validate(&self) -> Result<()> {
        if let Some((unit, dep)) = self.first_unresolved() {
            return Err(InitdagError::UnresolvedDependency {
                unit: unit.to_string(),
                dependency: dep.to_string(),
            });
        }

        if let Some(unit) = self.first_self_dependent() {
            return Err(InitdagError::SelfDependency(unit.to_string()));
        }

        // A topological sort will fail if there is a cycle.
        match toposort(&self.petgraph(), None) {
            Ok(_order) => Ok(()),
            Err(cycle) => {
                let units = self
                    .find_cycle()
                    .unwrap_or_else(|| vec![cycle.node_id().to_string()]);
                Err(InitdagError::DependencyCycle { units })
            }
        }
    }

    /// Units taking part in some dependency cycle, in registration order.
    ///
    /// Returns the first strongly connected component that is a real cycle
    /// (more than one unit, or a unit depending on itself).
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let graph = self.petgraph();

        let mut cycles: Vec<Vec<&str>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .collect();

        for scc in cycles.iter_mut() {
            scc.sort_by_key(|name| self.position_of(name));
        }
        cycles.sort_by_key(|scc| self.position_of(scc[0]));

        cycles
            .into_iter()
            .next()
            .map(|scc| scc.into_iter().map(str::to_string).collect())
    }

    fn position_of(&self, name: &str) -> usize {
        self.nodes
            .get(name)
            .map(|n| n.position)
            .unwrap_or(usize::MAX)
    }

    /// Edge direction: dep -> unit.
    ///
    /// Unknown dependencies are skipped; they are reported separately.
    fn petgraph(&self) -> DiGraphMap<&str, ()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in &self.order {
            graph.add_node(name.as_str());
        }

        for name in &self.order {
            for dep in self.dependencies_of(name) {
                if self.nodes.contains_key(dep.as_str()) {
                    graph.add_edge(dep.as_str(), name.as_str(), ());
                }
            }
        }

        graph
    }
}
