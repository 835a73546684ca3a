use std::sync::{Arc, Mutex};

use initdag::Observer;

/// One observer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Begin(String),
    Success(String),
    Error(String),
}

impl Event {
    pub fn begin(name: &str) -> Self {
        Event::Begin(name.to_string())
    }

    pub fn success(name: &str) -> Self {
        Event::Success(name.to_string())
    }

    pub fn error(name: &str) -> Self {
        Event::Error(name.to_string())
    }
}

/// Observer that records every notification.
///
/// Hand the manager an `Arc<RecordingObserver>` and keep a clone to inspect.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn on_begin(&self, name: &str) {
        self.events.lock().unwrap().push(Event::begin(name));
    }

    fn on_success(&self, name: &str) {
        self.events.lock().unwrap().push(Event::success(name));
    }

    fn on_error(&self, name: &str, _error: &anyhow::Error) {
        self.events.lock().unwrap().push(Event::error(name));
    }
}

/// Observer whose every hook panics.
#[derive(Debug, Default)]
pub struct PanickingObserver;

impl Observer for PanickingObserver {
    fn on_begin(&self, name: &str) {
        panic!("on_begin blew up for {name}");
    }

    fn on_success(&self, name: &str) {
        panic!("on_success blew up for {name}");
    }

    fn on_error(&self, name: &str, _error: &anyhow::Error) {
        panic!("on_error blew up for {name}");
    }
}
