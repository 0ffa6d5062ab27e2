// src/queue/table.rs

//! The task table: every record the queue still knows about, plus the
//! keys that have not been dispatched yet.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::queue::task::{TaskRecord, Work};
use crate::queue::token::{TaskKey, Token};

/// Shared mutable state of a queue. Always accessed under the queue's lock.
///
/// Invariant: every key in `pending` is also a key of `tasks`. A key missing
/// from `tasks` was either reclaimed after finishing or never issued.
pub(crate) struct TaskTable {
    pub(super) tasks: HashMap<TaskKey, TaskRecord>,
    /// Undispatched keys, in submission order.
    pub(super) pending: Vec<TaskKey>,
    next_key: TaskKey,
}

impl TaskTable {
    pub(crate) fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            pending: Vec::new(),
            next_key: TaskKey::MIN,
        }
    }

    /// Register `work` as pending and mint its token.
    ///
    /// Dependencies that are no longer in the table have already finished and
    /// are dropped here rather than treated as errors.
    pub(crate) fn insert(&mut self, work: Work, deps: impl IntoIterator<Item = Token>) -> Token {
        let key = self.next_key;
        self.next_key += 1;

        let deps: Vec<TaskKey> = deps
            .into_iter()
            .map(|t| t.key())
            .filter(|dep| {
                let known = self.tasks.contains_key(dep);
                if !known {
                    trace!(key, dep, "dependency already finished; dropping it");
                }
                known
            })
            .collect();

        debug!(key, ?deps, "task submitted");

        self.tasks.insert(key, TaskRecord::new(key, work, deps));
        self.pending.push(key);

        Token::new(key)
    }

    pub(crate) fn contains(&self, token: Token) -> bool {
        self.tasks.contains_key(&token.key())
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
