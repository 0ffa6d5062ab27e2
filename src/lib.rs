// src/lib.rs

//! A small dependency-aware task queue.
//!
//! Submit closures to a [`TaskQueue`], optionally naming earlier submissions
//! they must wait for; the queue starts each one on its own thread once its
//! dependencies have finished. See [`queue`] for the moving parts.
//!
//! The remaining modules back the `depqueue` benchmark binary.

pub mod bench;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod queue;
pub mod types;

pub use queue::{QueueOptions, TaskQueue, Token};

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::BenchConfig;
use crate::config::loader::load_and_validate;

/// High-level entry point used by `main.rs`.
///
/// Resolves the suite from `--config` (or the built-in one), applies CLI
/// overrides, runs it and prints the result table.
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let results = bench::run_suite(&cfg)?;
    print!("{}", bench::report::render_table(&results));

    Ok(())
}

fn resolve_config(args: &CliArgs) -> Result<BenchConfig> {
    let mut cfg = match args.config {
        Some(ref path) => load_and_validate(path)?,
        None => BenchConfig::builtin(args.workload),
    };

    if let Some(steps) = args.steps {
        anyhow::ensure!(steps >= 1, "--steps must be >= 1");
        cfg.suite.steps = steps;
    }
    if let Some(repetitions) = args.repetitions {
        anyhow::ensure!(repetitions >= 1, "--repetitions must be >= 1");
        cfg.suite.repetitions = repetitions;
    }

    Ok(cfg)
}

/// Simple dry-run output: print the suite and its workloads.
fn print_dry_run(cfg: &BenchConfig) {
    println!("depqueue dry-run");
    println!("  suite.steps = {}", cfg.suite.steps);
    println!("  suite.repetitions = {}", cfg.suite.repetitions);
    println!("  suite.base_size = {}", cfg.suite.base_size);
    println!();

    println!("workloads ({}):", cfg.workload.len());
    for (name, workload) in cfg.workload.iter() {
        println!("  - {name}");
        println!("      kind: {}", workload.kind);
        println!("      scale: {}", workload.scale);
        println!("      work_units: {}", workload.work_units);
    }

    debug!("dry-run complete (no execution)");
}
