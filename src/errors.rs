// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepQueueError {
    #[error("task table poisoned: the scheduler loop hit a broken invariant")]
    Poisoned,

    #[error("failed to start scheduler loop thread: {0}")]
    SpawnLoop(#[source] std::io::Error),

    #[error("scheduler loop thread panicked")]
    LoopPanicked,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DepQueueError>;
