// src/queue/scheduler_loop.rs

//! The background loop: promote ready tasks, reclaim finished ones, yield.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, trace, warn};

use crate::queue::Shared;
use crate::queue::options::QueueOptions;
use crate::queue::pass_report::PassReport;
use crate::queue::table::TaskTable;
use crate::queue::task::TaskRecord;
use crate::queue::token::TaskKey;

/// Initial capacity of the per-pass relevant set.
const MIN_RESERVE: usize = 100;

/// Start the loop thread for `shared`.
pub(crate) fn spawn_loop(shared: Arc<Shared>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(shared.options.loop_thread_name.clone())
        .spawn(move || run_loop(&shared))
}

fn run_loop(shared: &Shared) {
    debug!("scheduler loop started");

    let mut relevant: HashSet<TaskKey> = HashSet::with_capacity(MIN_RESERVE);

    while shared.running.load(Ordering::Acquire) {
        {
            let Ok(mut table) = shared.table.lock() else {
                error!("task table poisoned; scheduler loop exiting");
                return;
            };

            let report = table.run_pass(&shared.options, &mut relevant);
            if !report.is_quiet() {
                trace!(
                    launched = report.launched,
                    reclaimed = report.reclaimed,
                    pending = report.pending,
                    "scheduler pass"
                );
            }
        }

        thread::yield_now();
    }

    debug!("scheduler loop stopped");
}

impl TaskTable {
    /// One full pass: promotion followed by reclamation.
    ///
    /// `relevant` is scratch space reused across passes.
    pub(crate) fn run_pass(
        &mut self,
        options: &QueueOptions,
        relevant: &mut HashSet<TaskKey>,
    ) -> PassReport {
        relevant.clear();

        let launched = self.launch_ready(options, relevant);
        let reclaimed = self.reclaim_finished(relevant);

        PassReport {
            launched,
            reclaimed,
            pending: self.pending.len(),
        }
    }

    /// Dispatch every pending task none of whose dependencies is live.
    ///
    /// Fills `relevant` with the pending keys and their direct dependencies.
    /// Only one level is tracked: a dependency of a dependency is not kept
    /// alive by this set.
    fn launch_ready(&mut self, options: &QueueOptions, relevant: &mut HashSet<TaskKey>) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut still_pending = Vec::with_capacity(pending.len());
        let mut launched = 0;

        for key in pending {
            relevant.insert(key);

            if !self.deps_finished(key, relevant) {
                still_pending.push(key);
                continue;
            }

            let record = self.record_mut(key);
            match record.dispatch(options) {
                Ok(()) => {
                    debug!(key, "dependencies finished; task dispatched");
                    launched += 1;
                }
                Err(err) => {
                    warn!(key, error = %err, "failed to spawn worker thread; retrying next pass");
                    still_pending.push(key);
                }
            }
        }

        self.pending = still_pending;
        launched
    }

    /// Whether every dependency of the pending task `key` has finished.
    ///
    /// All dependencies are visited, not just up to the first live one, so
    /// that each of them lands in `relevant`.
    fn deps_finished(&self, key: TaskKey, relevant: &mut HashSet<TaskKey>) -> bool {
        let record = self.record(key);
        let mut ready = true;

        for &dep in record.deps() {
            let Some(dep_record) = self.tasks.get(&dep) else {
                error!(key, dep, "dependency was reclaimed while still required");
                panic!("task {dep} was removed from the table while task {key} still depends on it");
            };

            relevant.insert(dep);

            if dep_record.is_live() {
                ready = false;
            }
        }

        ready
    }

    /// Erase finished entries that no pending task refers to.
    fn reclaim_finished(&mut self, relevant: &HashSet<TaskKey>) -> usize {
        let before = self.tasks.len();

        self.tasks.retain(|key, record| {
            debug_assert!(record.is_live() || record.is_dispatched());
            relevant.contains(key) || record.is_live()
        });

        let reclaimed = before - self.tasks.len();
        if reclaimed > 0 {
            debug!(reclaimed, remaining = self.tasks.len(), "reclaimed finished tasks");
        }
        reclaimed
    }

    fn record(&self, key: TaskKey) -> &TaskRecord {
        match self.tasks.get(&key) {
            Some(record) => record,
            None => missing_pending(key),
        }
    }

    fn record_mut(&mut self, key: TaskKey) -> &mut TaskRecord {
        match self.tasks.get_mut(&key) {
            Some(record) => record,
            None => missing_pending(key),
        }
    }
}

fn missing_pending(key: TaskKey) -> ! {
    error!(key, "pending task is missing from the task table");
    panic!("pending task {key} was removed from the task table");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;
    use std::time::{Duration, Instant};

    use crate::queue::token::Token;

    /// Run passes until `done` holds, failing after a few seconds.
    fn pass_until(table: &mut TaskTable, mut done: impl FnMut(&TaskTable) -> bool) {
        let options = QueueOptions::default();
        let mut relevant = HashSet::new();
        let deadline = Instant::now() + Duration::from_secs(5);

        while !done(table) {
            assert!(Instant::now() < deadline, "table never reached expected state");
            table.run_pass(&options, &mut relevant);
            thread::yield_now();
        }
    }

    #[test]
    fn independent_task_is_launched_on_first_pass() {
        let mut table = TaskTable::new();
        table.insert(Box::new(|| {}), []);

        let report = table.run_pass(&QueueOptions::default(), &mut HashSet::new());

        assert_eq!(report.launched, 1);
        assert_eq!(report.pending, 0);
    }

    #[test]
    fn dependent_waits_for_live_dependency() {
        let gate = Arc::new(AtomicBool::new(false));
        let g = Arc::clone(&gate);

        let mut table = TaskTable::new();
        let a = table.insert(
            Box::new(move || {
                while !g.load(Ordering::Acquire) {
                    thread::yield_now();
                }
            }),
            [],
        );
        let b = table.insert(Box::new(|| {}), [a]);

        let options = QueueOptions::default();
        let mut relevant = HashSet::new();

        let first = table.run_pass(&options, &mut relevant);
        assert_eq!(first.launched, 1);
        assert_eq!(table.pending, vec![b.key()]);

        let second = table.run_pass(&options, &mut relevant);
        assert_eq!(second.launched, 0);
        assert!(relevant.contains(&a.key()));

        gate.store(true, Ordering::Release);
        pass_until(&mut table, |t| t.pending.is_empty());
        pass_until(&mut table, |t| t.is_empty());
    }

    #[test]
    fn finished_dependency_survives_while_referenced() {
        let gate = Arc::new(AtomicBool::new(false));
        let g = Arc::clone(&gate);

        let mut table = TaskTable::new();
        let a = table.insert(Box::new(|| {}), []);
        let blocker = table.insert(
            Box::new(move || {
                while !g.load(Ordering::Acquire) {
                    thread::yield_now();
                }
            }),
            [],
        );
        let c = table.insert(Box::new(|| {}), [a, blocker]);

        // `a` finishes quickly but `c` is still pending on `blocker`.
        pass_until(&mut table, |t| !t.tasks[&a.key()].is_live());
        let options = QueueOptions::default();
        for _ in 0..10 {
            table.run_pass(&options, &mut HashSet::new());
        }
        assert!(table.contains(a));
        assert!(table.contains(c));

        gate.store(true, Ordering::Release);
        pass_until(&mut table, |t| t.is_empty());
    }

    #[test]
    fn side_effects_of_dependency_are_visible() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (s1, s2) = (Arc::clone(&seen), Arc::clone(&seen));

        let mut table = TaskTable::new();
        let a = table.insert(Box::new(move || s1.lock().unwrap().push("a")), []);
        table.insert(Box::new(move || s2.lock().unwrap().push("b")), [a]);

        pass_until(&mut table, |t| t.is_empty());

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "still depends on it")]
    fn vanished_dependency_is_fatal() {
        let mut table = TaskTable::new();
        let a = table.insert(Box::new(|| {}), []);
        table.insert(Box::new(|| {}), [a]);

        table.tasks.remove(&a.key());
        table.pending.retain(|k| *k != a.key());

        table.run_pass(&QueueOptions::default(), &mut HashSet::new());
    }

    #[test]
    #[should_panic(expected = "removed from the task table")]
    fn vanished_pending_task_is_fatal() {
        let mut table = TaskTable::new();
        let a = table.insert(Box::new(|| {}), []);
        table.tasks.remove(&a.key());

        table.run_pass(&QueueOptions::default(), &mut HashSet::new());
    }

    #[test]
    fn token_for_unknown_key_is_absent() {
        let table = TaskTable::new();
        assert!(!table.contains(Token::new(5)));
    }
}
