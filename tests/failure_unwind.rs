// tests/failure_unwind.rs

use std::sync::Arc;

use initdag::{Manager, ManagerState, UnitDef, WalkOutcome};
use initdag_test_utils::builders::{failing_unit, ok_unit};
use initdag_test_utils::init_tracing;
use initdag_test_utils::journal::{Call, Journal};
use initdag_test_utils::observer::{Event, PanickingObserver, RecordingObserver};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn failing_unit_unwinds_started_units_in_reverse() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let observer = RecordingObserver::shared();
    let manager: Manager<()> = Manager::with_observer(Arc::clone(&observer));

    manager.register(ok_unit(&journal, "A", &[]))?;
    manager.register(ok_unit(&journal, "B", &["A"]))?;
    manager.register(failing_unit(&journal, "C", &["A"]))?;

    let outcome = manager.run(&())?;

    assert_eq!(
        outcome,
        WalkOutcome::Failed {
            unit: "C".to_string(),
            stopped: names(&["B", "A"]),
        }
    );
    assert!(!outcome.is_success());
    assert_eq!(
        journal.calls(),
        vec![
            Call::Start("A".into()),
            Call::Start("B".into()),
            Call::Start("C".into()),
            Call::Stop("B".into()),
            Call::Stop("A".into()),
        ]
    );
    assert_eq!(
        observer.events(),
        vec![
            Event::begin("A"),
            Event::success("A"),
            Event::begin("B"),
            Event::success("B"),
            Event::begin("C"),
            Event::error("C"),
        ]
    );
    assert!(manager.started_order().is_empty());
    assert_eq!(manager.state(), ManagerState::Unwound);
    Ok(())
}

#[test]
fn failure_before_sibling_only_stops_what_started() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "A", &[]))?;
    manager.register(failing_unit(&journal, "C", &["A"]))?;
    manager.register(ok_unit(&journal, "B", &["A"]))?;

    let outcome = manager.run(&())?;

    assert_eq!(
        outcome,
        WalkOutcome::Failed {
            unit: "C".to_string(),
            stopped: names(&["A"]),
        }
    );
    assert_eq!(journal.starts(), names(&["A", "C"]));
    assert_eq!(journal.stops(), names(&["A"]));
    Ok(())
}

#[test]
fn dependents_of_a_failed_unit_never_start() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "U", &["D"]))?;
    manager.register(ok_unit(&journal, "V", &["U"]))?;
    manager.register(failing_unit(&journal, "D", &[]))?;

    let outcome = manager.run(&())?;

    assert_eq!(
        outcome,
        WalkOutcome::Failed {
            unit: "D".to_string(),
            stopped: Vec::new(),
        }
    );
    assert_eq!(journal.starts(), names(&["D"]));
    assert!(journal.stops().is_empty());
    assert_eq!(manager.pending_units(), names(&["U", "V", "D"]));
    Ok(())
}

#[test]
fn teardown_after_failed_walk_is_a_noop() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "A", &[]))?;
    manager.register(failing_unit(&journal, "B", &["A"]))?;

    manager.run(&())?;
    let calls = journal.calls();

    manager.teardown();
    assert_eq!(journal.calls(), calls);
    assert_eq!(manager.state(), ManagerState::Unwound);
    Ok(())
}

#[test]
fn panicking_stop_action_does_not_interrupt_unwind() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::new();

    manager.register(ok_unit(&journal, "A", &[]))?;
    manager.register(UnitDef::new("B").after("A").on_stop(|| panic!("stop failed")))?;
    manager.register(ok_unit(&journal, "C", &["B"]))?;
    manager.register(failing_unit(&journal, "D", &["C"]))?;

    let outcome = manager.run(&())?;

    assert_eq!(
        outcome,
        WalkOutcome::Failed {
            unit: "D".to_string(),
            stopped: names(&["C", "B", "A"]),
        }
    );
    assert_eq!(journal.stops(), names(&["C", "A"]));
    Ok(())
}

#[test]
fn panicking_observer_does_not_change_the_outcome() -> TestResult {
    init_tracing();
    let journal = Journal::new();
    let manager: Manager<()> = Manager::with_observer(PanickingObserver);

    manager.register(ok_unit(&journal, "A", &[]))?;
    manager.register(ok_unit(&journal, "B", &["A"]))?;

    assert_eq!(manager.run(&())?, WalkOutcome::Started);
    assert_eq!(journal.starts(), names(&["A", "B"]));

    let failing: Manager<()> = Manager::with_observer(PanickingObserver);
    failing.register(ok_unit(&journal, "X", &[]))?;
    failing.register(failing_unit(&journal, "Y", &["X"]))?;

    assert_eq!(
        failing.run(&())?,
        WalkOutcome::Failed {
            unit: "Y".to_string(),
            stopped: names(&["X"]),
        }
    );
    Ok(())
}

#[test]
fn error_from_start_action_reaches_the_observer() -> TestResult {
    use std::sync::Mutex;

    use initdag::Observer;

    #[derive(Default)]
    struct Messages(Mutex<Vec<String>>);

    impl Observer for Messages {
        fn on_error(&self, name: &str, error: &anyhow::Error) {
            self.0.lock().unwrap().push(format!("{name}: {error}"));
        }
    }

    init_tracing();
    let messages = Arc::new(Messages::default());
    let manager: Manager<()> = Manager::with_observer(Arc::clone(&messages));

    manager.register(
        UnitDef::new("db").on_start(|_| Err(anyhow::anyhow!("port 5432 in use"))),
    )?;

    assert!(!manager.run(&())?.is_success());
    assert_eq!(*messages.0.lock().unwrap(), vec!["db: port 5432 in use"]);
    Ok(())
}
