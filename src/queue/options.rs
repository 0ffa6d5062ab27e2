// src/queue/options.rs

//! Thread-level knobs for a [`TaskQueue`](super::TaskQueue).

/// Options applied when the queue spawns its loop and worker threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOptions {
    /// Name given to the background scheduler thread.
    pub loop_thread_name: String,
    /// Worker threads are named `<prefix>-<key>`.
    pub worker_name_prefix: String,
    /// Stack size for worker threads; `None` uses the platform default.
    pub worker_stack_size: Option<usize>,
}

impl QueueOptions {
    pub fn loop_thread_name(mut self, name: impl Into<String>) -> Self {
        self.loop_thread_name = name.into();
        self
    }

    pub fn worker_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.worker_name_prefix = prefix.into();
        self
    }

    pub fn worker_stack_size(mut self, bytes: usize) -> Self {
        self.worker_stack_size = Some(bytes);
        self
    }
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            loop_thread_name: "depqueue-loop".to_string(),
            worker_name_prefix: "depqueue-worker".to_string(),
            worker_stack_size: None,
        }
    }
}
