// src/queue/mod.rs

//! Dependency-aware task queue.
//!
//! - [`token`] holds the opaque [`Token`] handed back by submissions.
//! - [`task`] wraps user work so that finishing it clears a liveness flag.
//! - [`table`] is the keyed record store plus the pending list.
//! - [`scheduler_loop`] runs the promote/reclaim passes on a background thread.
//! - [`options`] configures thread names and worker stack size.
//!
//! [`TaskQueue`] ties these together behind a single lock.

pub mod options;
pub mod pass_report;
mod scheduler_loop;
mod table;
mod task;
pub mod token;

pub use options::QueueOptions;
pub use pass_report::PassReport;
pub use token::Token;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::errors::{DepQueueError, Result};
use table::TaskTable;

/// State shared between the facade and the loop thread.
pub(crate) struct Shared {
    pub(crate) table: Mutex<TaskTable>,
    pub(crate) running: AtomicBool,
    pub(crate) options: QueueOptions,
}

/// A queue that runs submitted closures once their dependencies finish.
///
/// Every promoted task runs on its own OS thread; a single background thread
/// polls the table to find ready work and to drop finished entries. Waiting is
/// done by polling too: [`wait`](Self::wait) returns once the task's entry has
/// been reclaimed.
///
/// Dependencies must form an acyclic graph. A task that depends on itself, or
/// any cycle, is never started and waiting on it never returns.
///
/// Dropping the queue blocks until every submitted task has finished.
///
/// A task body may submit work and may wait on *other* tasks' tokens, but it
/// must not wait on its own token, call [`wait_all`](Self::wait_all), or drop
/// the last handle to the queue (for example the last `Arc<TaskQueue>`): its
/// own entry stays live until the body returns, so each of these spins
/// forever on the worker thread and the loop thread is never stopped.
///
/// ```no_run
/// use depqueue::TaskQueue;
///
/// # fn main() -> depqueue::errors::Result<()> {
/// let queue = TaskQueue::new()?;
/// let fetch = queue.submit(|| println!("fetch"))?;
/// let parse = queue.submit_after(|| println!("parse"), [fetch])?;
/// queue.wait(parse)?;
/// # Ok(())
/// # }
/// ```
pub struct TaskQueue {
    shared: Arc<Shared>,
    loop_handle: Option<JoinHandle<()>>,
}

impl TaskQueue {
    /// Create a queue with default options and start its loop.
    pub fn new() -> Result<Self> {
        Self::with_options(QueueOptions::default())
    }

    /// Create a queue with the given thread options and start its loop.
    pub fn with_options(options: QueueOptions) -> Result<Self> {
        let shared = Arc::new(Shared {
            table: Mutex::new(TaskTable::new()),
            running: AtomicBool::new(true),
            options,
        });

        let loop_handle =
            scheduler_loop::spawn_loop(Arc::clone(&shared)).map_err(DepQueueError::SpawnLoop)?;

        Ok(Self {
            shared,
            loop_handle: Some(loop_handle),
        })
    }

    /// Submit a task with no dependencies.
    pub fn submit<F>(&self, work: F) -> Result<Token>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_after(work, std::iter::empty())
    }

    /// Submit a task that may only start once every task in `deps` has finished.
    ///
    /// Tokens naming tasks that already finished are ignored.
    pub fn submit_after<F, I>(&self, work: F, deps: I) -> Result<Token>
    where
        F: FnOnce() + Send + 'static,
        I: IntoIterator<Item = Token>,
    {
        let mut table = self.lock_table()?;
        Ok(table.insert(Box::new(work), deps))
    }

    /// Block until the task behind `token` has finished and been reclaimed.
    ///
    /// Returns immediately for tokens that no longer match any entry.
    pub fn wait(&self, token: Token) -> Result<()> {
        while self.lock_table()?.contains(token) {
            thread::yield_now();
        }
        Ok(())
    }

    /// Block until each of `tokens` has finished.
    pub fn wait_many(&self, tokens: &[Token]) -> Result<()> {
        for &token in tokens {
            self.wait(token)?;
        }
        Ok(())
    }

    /// Block until the table is empty, including work submitted meanwhile.
    pub fn wait_all(&self) -> Result<()> {
        while !self.lock_table()?.is_empty() {
            thread::yield_now();
        }
        Ok(())
    }

    /// Async variant of [`wait`](Self::wait) that yields to the tokio
    /// scheduler between polls instead of the OS.
    pub async fn wait_async(&self, token: Token) -> Result<()> {
        while self.contains(token)? {
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Async variant of [`wait_all`](Self::wait_all).
    pub async fn wait_all_async(&self) -> Result<()> {
        while !self.is_empty()? {
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Number of entries in the table: unfinished tasks plus finished ones
    /// not yet reclaimed.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock_table()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock_table()?.is_empty())
    }

    /// Number of tasks not yet dispatched.
    pub fn pending_len(&self) -> Result<usize> {
        Ok(self.lock_table()?.pending_len())
    }

    /// Drain the queue, stop the loop and report how the loop ended.
    ///
    /// Dropping the queue does the same but can only log failures.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn contains(&self, token: Token) -> Result<bool> {
        Ok(self.lock_table()?.contains(token))
    }

    fn lock_table(&self) -> Result<MutexGuard<'_, TaskTable>> {
        self.shared
            .table
            .lock()
            .map_err(|_| DepQueueError::Poisoned)
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.loop_handle.take() else {
            return Ok(());
        };

        let drained = self.wait_all();

        self.shared.running.store(false, Ordering::Release);
        let joined = handle.join().map_err(|_| DepQueueError::LoopPanicked);
        debug!("task queue stopped");

        drained.and(joined)
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            error!(error = %err, "task queue did not shut down cleanly");
        }
    }
}
