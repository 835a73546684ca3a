// src/manager/state.rs

//! Manager lifecycle state.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Where a manager is in its one-way lifecycle.
///
/// `Registering` is the only state that accepts registrations, and the only
/// state from which a walk may begin. Everything after `Walking` is terminal
/// with respect to registration and walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ManagerState {
    Registering = 0,
    Walking = 1,
    /// Every unit started.
    Started = 2,
    /// A unit failed; the units started before it were stopped.
    Unwound = 3,
    /// The walk hit a configuration defect and stopped without unwinding.
    Aborted = 4,
    /// Torn down, or being torn down, after a successful walk.
    Stopped = 5,
}

impl ManagerState {
    pub fn accepts_registrations(self) -> bool {
        self == ManagerState::Registering
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ManagerState::Registering,
            1 => ManagerState::Walking,
            2 => ManagerState::Started,
            3 => ManagerState::Unwound,
            4 => ManagerState::Aborted,
            _ => ManagerState::Stopped,
        }
    }
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ManagerState::Registering => "registering",
            ManagerState::Walking => "walking",
            ManagerState::Started => "started",
            ManagerState::Unwound => "unwound",
            ManagerState::Aborted => "aborted",
            ManagerState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Lock-free mirror of the state, readable while the walk holds the lock.
///
/// `run` and `teardown` claim their transition with [`StateCell::advance`]
/// before taking the lock; every other write happens under it.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(ManagerState::Registering as u8))
    }

    pub fn load(&self) -> ManagerState {
        ManagerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: ManagerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to` if the state is still `from`.
    pub fn advance(&self, from: ManagerState, to: ManagerState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
