// src/bench/workload.rs

//! Workloads submitted to a [`TaskQueue`] by the benchmark harness.
//!
//! Each workload checks its own result so that a benchmark run also doubles
//! as a smoke test of the dependency ordering.

use std::hint::black_box;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Result, ensure};

use crate::queue::{TaskQueue, Token};
use crate::types::WorkloadKind;

/// CPU-bound filler for task bodies.
pub fn spin_work(units: u64) -> u64 {
    let mut acc = 0u64;
    for i in 0..units {
        acc = acc.wrapping_add((black_box(i) as f64).sqrt() as u64);
    }
    black_box(acc)
}

/// Run one workload of `size` tasks on a fresh queue and time it from the
/// first submission until the queue is drained.
pub fn run_once(kind: WorkloadKind, size: usize, work_units: u64) -> Result<Duration> {
    let queue = TaskQueue::new()?;
    let start = Instant::now();

    match kind {
        WorkloadKind::Independent => independent(&queue, size, work_units)?,
        WorkloadKind::Chain => chain(&queue, size, work_units)?,
        WorkloadKind::FanIn => fan_in(&queue, size, work_units)?,
        WorkloadKind::Layered => {
            let inputs = layered_inputs(size, 32);
            let expected = layered_sequential(inputs.clone());
            let got = layered_pipeline(&queue, inputs)?;
            ensure!(got == expected, "layered pipeline scored {got}, expected {expected}");
        }
    }

    queue.wait_all()?;
    let elapsed = start.elapsed();
    queue.shutdown()?;

    Ok(elapsed)
}

fn independent(queue: &TaskQueue, size: usize, work_units: u64) -> Result<()> {
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..size {
        let done = Arc::clone(&done);
        queue.submit(move || {
            spin_work(work_units);
            done.fetch_add(1, Ordering::Relaxed);
        })?;
    }
    queue.wait_all()?;

    let finished = done.load(Ordering::Relaxed);
    ensure!(finished == size, "ran {finished} of {size} independent tasks");
    Ok(())
}

fn chain(queue: &TaskQueue, size: usize, work_units: u64) -> Result<()> {
    // Each link asserts it runs right after its predecessor.
    let counter = Arc::new(AtomicUsize::new(0));
    let broken = Arc::new(AtomicUsize::new(0));
    let mut prev: Option<Token> = None;

    for i in 0..size {
        let counter = Arc::clone(&counter);
        let broken = Arc::clone(&broken);
        let token = queue.submit_after(
            move || {
                spin_work(work_units);
                if counter.fetch_add(1, Ordering::AcqRel) != i {
                    broken.fetch_add(1, Ordering::Relaxed);
                }
            },
            prev,
        )?;
        prev = Some(token);
    }
    queue.wait_all()?;

    let broken = broken.load(Ordering::Relaxed);
    ensure!(broken == 0, "{broken} chain links ran out of order");
    Ok(())
}

fn fan_in(queue: &TaskQueue, size: usize, work_units: u64) -> Result<()> {
    let total = Arc::new(AtomicU64::new(0));
    let mut producers = Vec::with_capacity(size);

    for _ in 0..size {
        let total = Arc::clone(&total);
        producers.push(queue.submit(move || {
            spin_work(work_units);
            total.fetch_add(1, Ordering::Relaxed);
        })?);
    }

    let observed = Arc::new(AtomicU64::new(0));
    let (t, o) = (Arc::clone(&total), Arc::clone(&observed));
    let consumer = queue.submit_after(
        move || o.store(t.load(Ordering::Relaxed), Ordering::Relaxed),
        producers,
    )?;
    queue.wait(consumer)?;

    let seen = observed.load(Ordering::Relaxed);
    ensure!(
        seen == size as u64,
        "consumer saw {seen} of {size} producers finished"
    );
    Ok(())
}

/// Deterministic inputs for the layered pipeline: `count` vectors of `len`
/// values in `-100..=1000`.
pub fn layered_inputs(count: usize, len: usize) -> Vec<Vec<i64>> {
    // Small LCG; quality does not matter, reproducibility does.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..count)
        .map(|_| {
            (0..len)
                .map(|_| {
                    state = state
                        .wrapping_mul(6_364_136_223_846_793_005)
                        .wrapping_add(1_442_695_040_888_963_407);
                    ((state >> 33) % 1101) as i64 - 100
                })
                .collect()
        })
        .collect()
}

/// Count of even sums; the "combine" stage of the pipeline.
fn parity_score(sums: &[i64]) -> i64 {
    sums.iter().filter(|s| s.rem_euclid(2) == 0).count() as i64
}

/// Reference implementation of the layered pipeline without a queue.
pub fn layered_sequential(mut vecs: Vec<Vec<i64>>) -> i64 {
    let mut sums: Vec<i64> = vecs.iter().map(|v| v.iter().sum()).collect();
    let score = parity_score(&sums);

    for v in vecs.iter_mut() {
        for x in v.iter_mut() {
            *x += score;
        }
    }

    sums.extend(vecs.iter().map(|v| v.iter().sum::<i64>()));
    parity_score(&sums)
}

/// Run the five-stage pipeline on `queue`:
///
/// 1. sum every vector (independent)
/// 2. score the sums (after all of 1)
/// 3. add the score to every vector (each after 2)
/// 4. sum every vector again (each after all of 3)
/// 5. score all sums (after all of 4)
pub fn layered_pipeline(queue: &TaskQueue, vecs: Vec<Vec<i64>>) -> Result<i64> {
    let n = vecs.len();
    let vecs: Vec<Arc<Mutex<Vec<i64>>>> =
        vecs.into_iter().map(|v| Arc::new(Mutex::new(v))).collect();
    let sums = Arc::new(Mutex::new(vec![0i64; n * 2]));
    let score = Arc::new(AtomicI64::new(0));

    let mut first_sums = Vec::with_capacity(n);
    for (i, v) in vecs.iter().enumerate() {
        let (v, sums) = (Arc::clone(v), Arc::clone(&sums));
        first_sums.push(queue.submit(move || {
            let s: i64 = v.lock().map(|v| v.iter().sum()).unwrap_or_default();
            if let Ok(mut sums) = sums.lock() {
                sums[i] = s;
            }
        })?);
    }

    let first_score = {
        let (sums, score) = (Arc::clone(&sums), Arc::clone(&score));
        queue.submit_after(
            move || {
                if let Ok(sums) = sums.lock() {
                    score.store(parity_score(&sums[..n]), Ordering::Release);
                }
            },
            first_sums,
        )?
    };

    let mut adjusted = Vec::with_capacity(n);
    for v in vecs.iter() {
        let (v, score) = (Arc::clone(v), Arc::clone(&score));
        adjusted.push(queue.submit_after(
            move || {
                let delta = score.load(Ordering::Acquire);
                if let Ok(mut v) = v.lock() {
                    v.iter_mut().for_each(|x| *x += delta);
                }
            },
            [first_score],
        )?);
    }

    let mut second_sums = Vec::with_capacity(n);
    for (i, v) in vecs.iter().enumerate() {
        let (v, sums) = (Arc::clone(v), Arc::clone(&sums));
        second_sums.push(queue.submit_after(
            move || {
                let s: i64 = v.lock().map(|v| v.iter().sum()).unwrap_or_default();
                if let Ok(mut sums) = sums.lock() {
                    sums[n + i] = s;
                }
            },
            adjusted.iter().copied(),
        )?);
    }

    let final_score = {
        let (sums, score) = (Arc::clone(&sums), Arc::clone(&score));
        queue.submit_after(
            move || {
                if let Ok(sums) = sums.lock() {
                    score.store(parity_score(&sums), Ordering::Release);
                }
            },
            second_sums,
        )?
    };

    queue.wait(final_score)?;
    Ok(score.load(Ordering::Acquire))
}
