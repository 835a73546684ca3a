// tests/walk_order.rs

use std::sync::{Arc, Mutex, OnceLock, Weak};

use initdag::{Manager, ManagerState, Observer, UnitDef, WalkOutcome};
use initdag_test_utils::builders::ok_unit;
use initdag_test_utils::{finishes, init_tracing};
use initdag_test_utils::journal::Journal;
use initdag_test_utils::observer::{Event, RecordingObserver};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn chain_registered_backwards_starts_in_dependency_order() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "C", &["B"]))?;
    manager.register(ok_unit(&journal, "B", &["A"]))?;
    manager.register(ok_unit(&journal, "A", &[]))?;

    assert_eq!(manager.run(&())?, WalkOutcome::Started);
    assert_eq!(journal.starts(), names(&["A", "B", "C"]));
    assert_eq!(manager.started_order(), names(&["C", "B", "A"]));
    assert!(manager.pending_units().is_empty());
    assert_eq!(manager.state(), ManagerState::Started);
    Ok(())
}

#[test]
fn dependents_later_in_the_same_pass_start_in_that_pass() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let observer = RecordingObserver::shared();
    let manager: Manager<()> = Manager::with_observer(Arc::clone(&observer));

    // A, then B (needs A), then C (needs B): one pass starts all three.
    manager.register(ok_unit(&journal, "A", &[]))?;
    manager.register(ok_unit(&journal, "B", &["A"]))?;
    manager.register(ok_unit(&journal, "C", &["B"]))?;

    assert!(manager.run(&())?.is_success());
    assert_eq!(
        observer.events(),
        vec![
            Event::begin("A"),
            Event::success("A"),
            Event::begin("B"),
            Event::success("B"),
            Event::begin("C"),
            Event::success("C"),
        ]
    );
    Ok(())
}

#[test]
fn simultaneously_ready_units_start_in_registration_order() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "web", &["db", "cache"]))?;
    manager.register(ok_unit(&journal, "cache", &[]))?;
    manager.register(ok_unit(&journal, "worker", &["db"]))?;
    manager.register(ok_unit(&journal, "db", &[]))?;
    manager.register(ok_unit(&journal, "metrics", &[]))?;

    manager.run(&())?;

    // Pass 1: web waits, cache starts, worker waits, db starts, metrics starts.
    // Pass 2: web, worker.
    assert_eq!(
        journal.starts(),
        names(&["cache", "db", "metrics", "web", "worker"])
    );
    Ok(())
}

#[test]
fn plan_matches_the_realized_order() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "api", &["auth", "store"]))?;
    manager.register(ok_unit(&journal, "auth", &["store"]))?;
    manager.register(ok_unit(&journal, "store", &[]))?;
    manager.register(ok_unit(&journal, "cron", &["api"]))?;

    manager.validate()?;
    let plan = manager.plan()?;
    assert!(journal.calls().is_empty(), "planning must not run any action");

    manager.run(&())?;
    assert_eq!(journal.starts(), plan);
    Ok(())
}

#[test]
fn args_are_threaded_to_every_start_action() -> TestResult {
    init_tracing();

    #[derive(Debug)]
    struct Ctx {
        greeting: &'static str,
    }

    let seen = Arc::new(Mutex::new(Vec::new()));
    let manager: Manager<Ctx> = Manager::new();

    for (name, deps) in [("one", vec![]), ("two", vec!["one"])] {
        let seen = Arc::clone(&seen);
        manager.register(UnitDef::new(name).after_all(deps).on_start(
            move |ctx: &Ctx| {
                seen.lock().unwrap().push(format!("{name}:{}", ctx.greeting));
                Ok(())
            },
        ))?;
    }

    manager.run(&Ctx { greeting: "hi" })?;
    assert_eq!(*seen.lock().unwrap(), vec!["one:hi", "two:hi"]);
    Ok(())
}

#[test]
fn empty_manager_runs_successfully() -> TestResult {
    init_tracing();
    let manager: Manager<()> = Manager::new();

    assert!(manager.is_empty());
    assert_eq!(manager.run(&())?, WalkOutcome::Started);
    assert!(manager.started_order().is_empty());
    Ok(())
}

#[test]
fn teardown_stops_in_reverse_start_order_once() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new().named("teardown-test");

    manager.register(ok_unit(&journal, "db", &[]))?;
    manager.register(ok_unit(&journal, "api", &["db"]))?;
    manager.register(ok_unit(&journal, "ui", &["api"]))?;
    manager.register(ok_unit(&journal, "logs", &[]))?;

    manager.run(&())?;
    let started = journal.starts();

    manager.teardown();
    let mut expected = started.clone();
    expected.reverse();
    assert_eq!(journal.stops(), expected);
    assert!(manager.started_order().is_empty());
    assert_eq!(manager.state(), ManagerState::Stopped);

    // Idempotent.
    manager.teardown();
    assert_eq!(journal.stops().len(), started.len());
    Ok(())
}

#[test]
fn duplicate_dependency_entries_are_harmless() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "A", &[]))?;
    let def: UnitDef<()> = UnitDef::new("B").after("A").after("A");
    assert_eq!(def.dependencies(), ["A"]);
    manager.register(def)?;

    manager.run(&())?;
    assert_eq!(manager.started_order(), names(&["B", "A"]));
    Ok(())
}

/// Reads its own manager's progress from every `on_success`.
#[derive(Default)]
struct ProgressObserver {
    manager: OnceLock<Weak<Manager<()>>>,
    snapshots: Mutex<Vec<(Vec<String>, Vec<String>, usize, bool)>>,
}

impl Observer for ProgressObserver {
    fn on_success(&self, _name: &str) {
        if let Some(manager) = self.manager.get().and_then(Weak::upgrade) {
            let snapshot = (
                manager.started_order(),
                manager.pending_units(),
                manager.len(),
                manager.contains("cache"),
            );
            self.snapshots.lock().unwrap().push(snapshot);
        }
    }
}

#[test]
fn observer_can_inspect_its_manager_mid_walk() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let observer = Arc::new(ProgressObserver::default());
    let manager: Arc<Manager<()>> = Arc::new(Manager::with_observer(Arc::clone(&observer)));
    observer.manager.set(Arc::downgrade(&manager)).unwrap();

    manager.register(ok_unit(&journal, "db", &[]))?;
    manager.register(ok_unit(&journal, "api", &["db"]))?;
    manager.register(ok_unit(&journal, "cache", &[]))?;

    let walker = Arc::clone(&manager);
    assert!(finishes(move || walker.run(&()))?.is_success());

    assert_eq!(
        *observer.snapshots.lock().unwrap(),
        vec![
            (names(&["db"]), names(&["api", "cache"]), 3, true),
            (names(&["api", "db"]), names(&["cache"]), 3, true),
            (names(&["cache", "api", "db"]), names(&[]), 3, true),
        ]
    );
    assert_eq!(manager.started_order(), names(&["cache", "api", "db"]));
    Ok(())
}
