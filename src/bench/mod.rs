// src/bench/mod.rs

//! Micro-benchmark harness that drives a [`TaskQueue`](crate::TaskQueue) as
//! a black box.
//!
//! - [`workload`] builds the task graphs and verifies their results.
//! - [`report`] renders measured samples as a text table.

pub mod report;
pub mod workload;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::validate::step_size;
use crate::config::{BenchConfig, WorkloadConfig};
use crate::errors::DepQueueError;
use crate::types::WorkloadKind;

/// Fastest observed run for one problem size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub size: usize,
    pub best: Duration,
}

/// All samples of one configured workload.
#[derive(Debug, Clone)]
pub struct WorkloadResult {
    pub name: String,
    pub kind: WorkloadKind,
    pub samples: Vec<Sample>,
}

/// Run every workload in `cfg` and collect its samples.
pub fn run_suite(cfg: &BenchConfig) -> Result<Vec<WorkloadResult>> {
    let mut results = Vec::with_capacity(cfg.workload.len());

    for (name, workload) in cfg.workload.iter() {
        info!(workload = %name, kind = %workload.kind, "running workload");
        let samples = run_workload(cfg, workload)
            .with_context(|| format!("running workload '{name}'"))?;

        results.push(WorkloadResult {
            name: name.clone(),
            kind: workload.kind,
            samples,
        });
    }

    Ok(results)
}

fn run_workload(cfg: &BenchConfig, workload: &WorkloadConfig) -> Result<Vec<Sample>> {
    let suite = &cfg.suite;

    (1..=suite.steps)
        .map(|step| -> Result<Sample> {
            let size = step_size(suite.base_size, step, workload.scale).ok_or_else(|| {
                DepQueueError::ConfigError(format!(
                    "step {step}: base_size {} * scale {} overflows usize",
                    suite.base_size, workload.scale
                ))
            })?;
            let mut best = Duration::MAX;

            for rep in 0..suite.repetitions {
                let elapsed = workload::run_once(workload.kind, size, workload.work_units)?;
                debug!(size, rep, elapsed_us = elapsed.as_micros() as u64, "repetition finished");
                best = best.min(elapsed);
            }

            Ok(Sample { size, best })
        })
        .collect()
}
