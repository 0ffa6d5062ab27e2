// src/queue/task.rs

//! Task records and the worker-side completion wrapping.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{trace, warn};

use crate::queue::options::QueueOptions;
use crate::queue::token::TaskKey;

/// Unit of user work accepted by the queue.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Slot shared between a record and its worker so the body can be handed
/// back if the worker thread never starts.
type WorkSlot = Arc<Mutex<Option<Work>>>;

/// One entry of the task table.
///
/// The worker never borrows the record: it owns a clone of the liveness
/// flag, so the table is free to rehash while the body is running.
pub(crate) struct TaskRecord {
    key: TaskKey,
    live: Arc<AtomicBool>,
    work: Option<Work>,
    deps: Vec<TaskKey>,
    /// Dropping a `JoinHandle` detaches the thread, so reclaiming a record
    /// never waits on its worker.
    handle: Option<JoinHandle<()>>,
}

impl TaskRecord {
    pub(crate) fn new(key: TaskKey, work: Work, deps: Vec<TaskKey>) -> Self {
        Self {
            key,
            live: Arc::new(AtomicBool::new(true)),
            work: Some(work),
            deps,
            handle: None,
        }
    }

    /// Declared dependencies, in submission order.
    pub(crate) fn deps(&self) -> &[TaskKey] {
        &self.deps
    }

    /// `true` until the wrapped body has finished running, however it ended.
    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn is_dispatched(&self) -> bool {
        self.handle.is_some()
    }

    /// Start the body on a fresh worker thread.
    ///
    /// On failure the body is put back so that a later pass can retry.
    pub(crate) fn dispatch(&mut self, options: &QueueOptions) -> io::Result<()> {
        let Some(work) = self.work.take() else {
            return Ok(());
        };

        let key = self.key;
        let slot: WorkSlot = Arc::new(Mutex::new(Some(work)));
        let worker_slot = Arc::clone(&slot);
        let live = Arc::clone(&self.live);

        let mut builder =
            thread::Builder::new().name(format!("{}-{}", options.worker_name_prefix, key));
        if let Some(size) = options.worker_stack_size {
            builder = builder.stack_size(size);
        }

        match builder.spawn(move || run_worker(key, worker_slot, LivenessGuard(live))) {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.work = slot.lock().ok().and_then(|mut w| w.take());
                Err(err)
            }
        }
    }
}

/// Clears the liveness flag when dropped, including during unwinding.
struct LivenessGuard(Arc<AtomicBool>);

impl Drop for LivenessGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn run_worker(key: TaskKey, slot: WorkSlot, guard: LivenessGuard) {
    let work = slot.lock().ok().and_then(|mut w| w.take());

    if let Some(work) = work {
        trace!(key, "task body starting");
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
            warn!(
                key,
                panic = %panic_message(payload.as_ref()),
                "task body panicked; marking finished"
            );
        }
    }

    drop(guard);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
