// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::WorkloadKind;

/// Benchmark configuration as read from a TOML file.
///
/// ```toml
/// [suite]
/// steps = 5
/// repetitions = 3
/// base_size = 64
///
/// [workload.wide]
/// kind = "independent"
/// work_units = 2000
///
/// [workload.deep]
/// kind = "chain"
/// scale = 2
/// ```
///
/// This is the unvalidated form; convert it into a [`BenchConfig`] with
/// `BenchConfig::try_from`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBenchConfig {
    #[serde(default)]
    pub suite: SuiteSection,

    /// Workloads keyed by a display name.
    #[serde(default)]
    pub workload: BTreeMap<String, WorkloadConfig>,
}

/// `[suite]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteSection {
    /// Number of problem sizes to measure: `base_size * 1 ..= base_size * steps`.
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Runs per size; the fastest one is reported.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,

    /// Task count of the smallest step.
    #[serde(default = "default_base_size")]
    pub base_size: usize,
}

fn default_steps() -> usize {
    5
}

fn default_repetitions() -> usize {
    3
}

fn default_base_size() -> usize {
    64
}

impl Default for SuiteSection {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            repetitions: default_repetitions(),
            base_size: default_base_size(),
        }
    }
}

/// `[workload.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    pub kind: WorkloadKind,

    /// Multiplier applied to every step's size for this workload.
    #[serde(default = "default_scale")]
    pub scale: usize,

    /// Busy-loop iterations performed by each task body.
    #[serde(default = "default_work_units")]
    pub work_units: u64,
}

fn default_scale() -> usize {
    1
}

fn default_work_units() -> u64 {
    1_000
}

impl WorkloadConfig {
    pub fn new(kind: WorkloadKind) -> Self {
        Self {
            kind,
            scale: default_scale(),
            work_units: default_work_units(),
        }
    }
}

/// A validated benchmark configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub suite: SuiteSection,
    pub workload: BTreeMap<String, WorkloadConfig>,
}

impl BenchConfig {
    /// Build without validation. Only used after `validate_raw_config`.
    pub(crate) fn new_unchecked(
        suite: SuiteSection,
        workload: BTreeMap<String, WorkloadConfig>,
    ) -> Self {
        Self { suite, workload }
    }

    /// Suite used when no config file is given: every workload kind, or only
    /// `only` if set, with default parameters.
    pub fn builtin(only: Option<WorkloadKind>) -> Self {
        let kinds: Vec<WorkloadKind> = match only {
            Some(kind) => vec![kind],
            None => WorkloadKind::ALL.to_vec(),
        };

        let workload = kinds
            .into_iter()
            .map(|kind| (kind.as_str().to_string(), WorkloadConfig::new(kind)))
            .collect();

        Self::new_unchecked(SuiteSection::default(), workload)
    }
}
