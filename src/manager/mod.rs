// src/manager/mod.rs

//! The lifecycle manager.
//!
//! A [`Manager`] owns one closed graph of units. It goes through a one-way
//! lifecycle (see [`ManagerState`]):
//!
//! 1. any number of [`Manager::register`] calls, from any thread;
//! 2. exactly one [`Manager::run`], which starts every unit in dependency
//!    order and unwinds on the first failure;
//! 3. [`Manager::teardown`], which stops the started units in reverse order.
//!
//! Configuration defects (duplicate names, unknown dependencies, cycles,
//! calls out of order) come back as [`InitdagError`]. A unit whose start
//! action fails is a normal outcome: [`WalkOutcome::Failed`].
//!
//! One lock guards all state, and `run` holds it for the whole walk. A start
//! action that never returns therefore stalls the manager; there is no
//! timeout. Calls made from inside a hook or an action never wait on that
//! lock: introspection answers from a progress view kept next to it, and
//! everything else fails fast (see [`Observer`]).

pub mod observer;
pub(crate) mod progress;
pub(crate) mod registry;
pub mod state;
pub(crate) mod walker;

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::{error, info, info_span, warn};

use crate::dag::ScanOutcome;
use crate::errors::{InitdagError, Result};
use crate::unit::{UnitDef, UnitId, UnitName};

pub use observer::{NoopObserver, Observer, TracingObserver};
pub use state::ManagerState;

use progress::Progress;
use registry::Registry;
use state::StateCell;

/// Result of a walk that did not hit a configuration defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Every registered unit started.
    Started,
    /// `unit`'s start action failed. The units in `stopped` had started
    /// before it and were stopped again, in this order.
    Failed {
        unit: UnitName,
        stopped: Vec<UnitName>,
    },
}

impl WalkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WalkOutcome::Started)
    }
}

/// Dependency-ordered lifecycle manager, generic over the argument type `A`
/// handed to every start action.
pub struct Manager<A> {
    name: String,
    inner: Mutex<Registry<A>>,
    progress: Progress,
    state: StateCell,
    observer: Box<dyn Observer>,
}

impl<A> Manager<A> {
    /// A manager with no observer.
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }

    pub fn with_observer(observer: impl Observer + 'static) -> Self {
        Self {
            name: "initdag".to_string(),
            inner: Mutex::new(Registry::new()),
            progress: Progress::default(),
            state: StateCell::new(),
            observer: Box::new(observer),
        }
    }

    /// Set the subsystem name used in log spans.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ManagerState {
        self.state.load()
    }

    /// Register a unit.
    ///
    /// Fails with [`InitdagError::DuplicateUnit`] if the name is taken and
    /// with [`InitdagError::RegisterAfterRun`] once the walk has begun.
    ///
    /// A registration that sees the walk already claimed fails at once. One
    /// that got past that check just before `run` took the lock waits for
    /// the walk to finish and is rejected then; it is never added.
    pub fn register(&self, def: UnitDef<A>) -> Result<UnitId> {
        // Checked before locking so a registration from inside a start action
        // fails instead of deadlocking on the walk's lock.
        if !self.state.load().accepts_registrations() {
            return Err(self.reject_late(def));
        }

        let mut registry = self.lock()?;

        // The walk may have begun while we waited for the lock.
        if !self.state.load().accepts_registrations() {
            return Err(self.reject_late(def));
        }

        registry.insert(def).inspect_err(|err| {
            error!(manager = %self.name, error = %err, "registration rejected");
        })
    }

    /// Start every registered unit in dependency order.
    ///
    /// May be called once. Returns `Ok(WalkOutcome::Failed { .. })` when a
    /// start action fails; the already-started units are stopped in reverse
    /// start order before this returns. Returns `Err` for configuration
    /// defects; a dependency cycle found mid-walk leaves the units started so
    /// far running.
    pub fn run(&self, args: &A) -> Result<WalkOutcome> {
        // Claimed before locking, so a second run from inside a start action
        // fails here instead of waiting on the walk's own lock.
        if !self.state.advance(ManagerState::Registering, ManagerState::Walking) {
            error!(manager = %self.name, state = %self.state.load(), "run called twice");
            return Err(InitdagError::AlreadyRun);
        }

        let mut registry = match self.lock() {
            Ok(registry) => registry,
            Err(err) => {
                self.state.store(ManagerState::Aborted);
                return Err(err);
            }
        };

        let span = info_span!("walk", manager = %self.name, units = registry.len());
        let _guard = span.enter();
        info!("starting walk");

        match walker::walk(&mut registry, args, &*self.observer, &self.progress) {
            Ok(ScanOutcome::Completed) => {
                self.state.store(ManagerState::Started);
                info!(started = registry.started_order.len(), "all units started");
                Ok(WalkOutcome::Started)
            }
            Ok(ScanOutcome::Failed(id)) => {
                let unit = registry.name_of(id).to_string();
                warn!(
                    unit = %unit,
                    to_stop = registry.started_order.len(),
                    "unit failed; unwinding started units"
                );
                let stopped = walker::unwind(&mut registry, &self.progress);
                self.state.store(ManagerState::Unwound);
                Ok(WalkOutcome::Failed { unit, stopped })
            }
            Err(err) => {
                self.state.store(ManagerState::Aborted);
                error!(
                    error = %err,
                    left_running = registry.started_order.len(),
                    "walk aborted on configuration defect"
                );
                Err(err)
            }
        }
    }

    /// Stop every started unit, most recently started first.
    ///
    /// A no-op unless the last walk started every unit, which includes a
    /// call made while the walk or another teardown is still running. After
    /// teardown the manager is terminal: it does not accept registrations or
    /// another walk.
    pub fn teardown(&self) {
        // Claimed before locking, so a teardown from inside a stop action is
        // a no-op instead of waiting on the lock held around it.
        if !self.state.advance(ManagerState::Started, ManagerState::Stopped) {
            info!(manager = %self.name, state = %self.state.load(), "teardown: nothing to stop");
            return;
        }

        let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = info_span!("teardown", manager = %self.name).entered();
        let stopped = walker::unwind(&mut registry, &self.progress);
        info!(stopped = stopped.len(), "teardown complete");
    }

    /// Check the registered graph without running anything: every dependency
    /// resolves, no self-dependency, no cycle.
    ///
    /// Reports the same variant a walk over the same graph would. Fails with
    /// [`InitdagError::Busy`] while a walk or teardown is running.
    pub fn validate(&self) -> Result<()> {
        let registry = self.lock_idle()?;
        registry.graph().validate()
    }

    /// The start order the walk would produce if every start action
    /// succeeded. Fails with [`InitdagError::Busy`] while a walk or teardown
    /// is running.
    pub fn plan(&self) -> Result<Vec<UnitName>> {
        let registry = self.lock_idle()?;
        walker::plan(&registry)
    }

    /// Names of started units, most recently started first.
    pub fn started_order(&self) -> Vec<UnitName> {
        self.inspect(|r| r.names_of(&r.started_order), Progress::started_order)
    }

    /// Names of units not started yet, in registration order.
    pub fn pending_units(&self) -> Vec<UnitName> {
        self.inspect(|r| r.names_of(&r.pending), Progress::pending_units)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inspect(|r| r.lookup(name).is_some(), |p| p.contains(name))
    }

    pub fn len(&self) -> usize {
        self.inspect(|r| r.len(), Progress::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Registry<A>>> {
        self.inner.lock().map_err(|_| InitdagError::Poisoned)
    }

    /// The lock, unless a walk or teardown holds it.
    fn lock_idle(&self) -> Result<MutexGuard<'_, Registry<A>>> {
        match self.inner.try_lock() {
            Ok(registry) => Ok(registry),
            Err(TryLockError::Poisoned(_)) => Err(InitdagError::Poisoned),
            // Registration holds it only for an insert.
            Err(TryLockError::WouldBlock) if self.state.load().accepts_registrations() => self.lock(),
            Err(TryLockError::WouldBlock) => Err(InitdagError::Busy),
        }
    }

    /// Read-only access for introspection, tolerant of poisoning. While a
    /// walk or teardown holds the lock the answer comes from `progress`.
    fn inspect<T>(&self, read: impl FnOnce(&Registry<A>) -> T, busy: impl FnOnce(&Progress) -> T) -> T {
        match self.inner.try_lock() {
            Ok(registry) => read(&registry),
            Err(TryLockError::Poisoned(poisoned)) => read(&poisoned.into_inner()),
            Err(TryLockError::WouldBlock) if self.state.load().accepts_registrations() => {
                read(&self.inner.lock().unwrap_or_else(PoisonError::into_inner))
            }
            Err(TryLockError::WouldBlock) => busy(&self.progress),
        }
    }

    fn reject_late(&self, def: UnitDef<A>) -> InitdagError {
        error!(
            manager = %self.name,
            unit = %def.name(),
            state = %self.state.load(),
            "registration after the walk started"
        );
        InitdagError::RegisterAfterRun(def.name)
    }
}

impl<A> Default for Manager<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Manager<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("name", &self.name)
            .field("state", &self.state.load())
            .finish_non_exhaustive()
    }
}
