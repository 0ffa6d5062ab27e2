// src/types.rs

//! Small value types shared by the CLI and the bench config.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

/// Shape of the dependency graph a benchmark workload submits.
///
/// - `Independent`: `n` tasks with no dependencies.
/// - `Chain`: `n` tasks, each depending on the one before it.
/// - `FanIn`: `n` producers plus one consumer that depends on all of them.
/// - `Layered`: a five-stage sum / combine / adjust / re-sum / combine
///   pipeline over `n` vectors, checked against a sequential run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadKind {
    Independent,
    Chain,
    FanIn,
    Layered,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 4] = [
        WorkloadKind::Independent,
        WorkloadKind::Chain,
        WorkloadKind::FanIn,
        WorkloadKind::Layered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Independent => "independent",
            WorkloadKind::Chain => "chain",
            WorkloadKind::FanIn => "fan_in",
            WorkloadKind::Layered => "layered",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
