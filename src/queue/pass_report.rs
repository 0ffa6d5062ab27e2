// src/queue/pass_report.rs

//! Summary of a single scheduler loop pass.

/// What one pass over the task table changed.
///
/// The loop only logs it, but tests drive passes by hand and assert on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Tasks dispatched onto worker threads in this pass.
    pub launched: usize,
    /// Finished, unreferenced entries erased in this pass.
    pub reclaimed: usize,
    /// Tasks still waiting on a dependency after this pass.
    pub pending: usize,
}

impl PassReport {
    /// `true` if the pass neither launched nor reclaimed anything.
    pub fn is_quiet(&self) -> bool {
        self.launched == 0 && self.reclaimed == 0
    }
}
