// src/bench/report.rs

use std::fmt::Write as _;

use crate::bench::WorkloadResult;

/// Render results as a fixed-width table, one row per sample.
pub fn render_table(results: &[WorkloadResult]) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<16} {:<12} {:>8} {:>14} {:>12}",
        "workload", "kind", "tasks", "best (us)", "ns/task"
    );

    for result in results {
        for sample in &result.samples {
            let nanos = sample.best.as_nanos();
            let per_task = nanos / sample.size.max(1) as u128;
            let _ = writeln!(
                out,
                "{:<16} {:<12} {:>8} {:>14} {:>12}",
                result.name,
                result.kind,
                sample.size,
                sample.best.as_micros(),
                per_task
            );
        }
    }

    out
}
