use std::sync::{Arc, Mutex};

use depqueue::errors::Result;
use depqueue::{TaskQueue, Token};

/// Shared log of task labels in the order their bodies ran.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, label: &str) {
        self.events.lock().unwrap().push(label.to_string());
    }

    /// Submit a task that records `label` when it runs.
    pub fn submit(&self, queue: &TaskQueue, label: &str, deps: &[Token]) -> Result<Token> {
        let this = self.clone();
        let label = label.to_string();
        queue.submit_after(move || this.record(&label), deps.iter().copied())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Position of `label` in the log, if it ran.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == label)
    }

    /// Panics unless `before` ran strictly before `after`.
    pub fn assert_before(&self, before: &str, after: &str) {
        let events = self.events();
        let b = self.position(before);
        let a = self.position(after);
        match (b, a) {
            (Some(b), Some(a)) => assert!(b < a, "{before} ran after {after}: {events:?}"),
            _ => panic!("missing {before} or {after} in {events:?}"),
        }
    }
}
