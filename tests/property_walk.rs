// tests/property_walk.rs

use std::collections::{HashMap, HashSet};

use initdag::{Manager, WalkOutcome};
use initdag_test_utils::builders::UnitBuilder;
use initdag_test_utils::journal::Journal;
use proptest::prelude::*;

/// A random acyclic graph: `deps[i]` only holds indices below `i`, plus a
/// random registration order.
#[derive(Debug, Clone)]
struct Graph {
    deps: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl Graph {
    fn name(i: usize) -> String {
        format!("unit_{i}")
    }

    fn build(&self, journal: &Journal, failing: Option<usize>) -> Manager<()> {
        let manager = Manager::new();
        for &i in &self.order {
            let mut builder = UnitBuilder::new(&Self::name(i));
            for &d in &self.deps[i] {
                builder = builder.after(&Self::name(d));
            }
            if failing == Some(i) {
                builder = builder.failing();
            }
            manager
                .register(builder.build(journal))
                .expect("generated names are unique");
        }
        manager
    }

    fn deps_by_name(&self) -> HashMap<String, Vec<String>> {
        self.deps
            .iter()
            .enumerate()
            .map(|(i, ds)| (Self::name(i), ds.iter().map(|&d| Self::name(d)).collect()))
            .collect()
    }
}

fn graph_strategy(max_units: usize) -> impl Strategy<Value = Graph> {
    (1..=max_units).prop_flat_map(|n| {
        let raw_deps = proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), n);
        let order = Just((0..n).collect::<Vec<_>>()).prop_shuffle();

        (raw_deps, order).prop_map(|(raw_deps, order)| {
            let deps = raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    if i == 0 {
                        return Vec::new();
                    }
                    let mut valid: Vec<usize> = potential.into_iter().map(|d| d % i).collect();
                    valid.sort_unstable();
                    valid.dedup();
                    valid
                })
                .collect();
            Graph { deps, order }
        })
    })
}

/// Every unit appears after all of its dependencies.
fn is_topological(order: &[String], deps: &HashMap<String, Vec<String>>) -> bool {
    let mut seen = HashSet::new();
    for name in order {
        if !deps[name].iter().all(|d| seen.contains(d)) {
            return false;
        }
        seen.insert(name.clone());
    }
    true
}

proptest! {
    #[test]
    fn acyclic_graphs_start_in_topological_order(graph in graph_strategy(12)) {
        let journal = Journal::new();
        let manager = graph.build(&journal, None);
        let plan = manager.plan().expect("acyclic graph has a plan");

        prop_assert_eq!(manager.run(&()).expect("no defects"), WalkOutcome::Started);

        let starts = journal.starts();
        prop_assert_eq!(starts.len(), graph.deps.len());
        prop_assert!(is_topological(&starts, &graph.deps_by_name()));
        prop_assert_eq!(&plan, &starts);

        let mut unwind_order = manager.started_order();
        unwind_order.reverse();
        prop_assert_eq!(unwind_order, starts);
    }

    #[test]
    fn a_failure_unwinds_exactly_the_started_units_in_reverse(
        graph in graph_strategy(12),
        pick in any::<prop::sample::Index>(),
    ) {
        let failing = pick.index(graph.deps.len());
        let journal = Journal::new();
        let manager = graph.build(&journal, Some(failing));

        let outcome = manager.run(&()).expect("no defects");

        let starts = journal.starts();
        prop_assert_eq!(starts.last(), Some(&Graph::name(failing)));

        let succeeded = &starts[..starts.len() - 1];
        let mut expected_stops = succeeded.to_vec();
        expected_stops.reverse();

        prop_assert_eq!(journal.stops(), expected_stops.clone());
        prop_assert_eq!(
            outcome,
            WalkOutcome::Failed { unit: Graph::name(failing), stopped: expected_stops }
        );
        prop_assert!(manager.started_order().is_empty());

        // Nothing that (transitively) needs the failed unit ever ran.
        let deps = graph.deps_by_name();
        let ran: HashSet<&String> = succeeded.iter().collect();
        for name in succeeded {
            prop_assert!(deps[name].iter().all(|d| ran.contains(d)));
        }
    }
}
