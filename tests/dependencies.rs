// tests/dependencies.rs

mod common;
use crate::common::recorder::Recorder;
use crate::common::{init_tracing, within};

use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use depqueue::{TaskQueue, Token};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn dependency_runs_before_dependent() -> TestResult {
    init_tracing();

    let queue = TaskQueue::new()?;
    let rec = Recorder::new();

    let a = rec.submit(&queue, "A", &[])?;
    let b = rec.submit(&queue, "B", &[a])?;
    queue.wait(b)?;

    rec.assert_before("A", "B");
    Ok(())
}

fn fill(target: Arc<Mutex<Vec<usize>>>, size: usize) -> impl FnOnce() + Send + 'static {
    move || {
        let mut v = target.lock().unwrap();
        v.clear();
        v.extend(0..size);
    }
}

#[test]
fn two_parallel_producers_feed_a_combiner() -> TestResult {
    init_tracing();

    let size = 10_000usize;
    let vec_a = Arc::new(Mutex::new(Vec::new()));
    let vec_b = Arc::new(Mutex::new(Vec::new()));
    let res = Arc::new(Mutex::new(vec![0usize; size]));

    {
        let queue = TaskQueue::new()?;

        let a = queue.submit(fill(Arc::clone(&vec_a), size))?;
        let b = queue.submit(fill(Arc::clone(&vec_b), size))?;

        let (va, vb, r) = (Arc::clone(&vec_a), Arc::clone(&vec_b), Arc::clone(&res));
        queue.submit_after(
            move || {
                let (va, vb) = (va.lock().unwrap(), vb.lock().unwrap());
                let mut r = r.lock().unwrap();
                for (out, (x, y)) in r.iter_mut().zip(va.iter().zip(vb.iter())) {
                    *out = x + y;
                }
            },
            [a, b],
        )?;
    }

    assert_eq!(res.lock().unwrap()[size - 1], (size - 1) * 2);
    Ok(())
}

#[test]
fn finished_dependency_is_satisfied_after_reclamation() -> TestResult {
    init_tracing();

    let queue = TaskQueue::new()?;
    let x = Arc::new(AtomicI32::new(0));
    let seen = Arc::new(AtomicI32::new(-1));

    let xa = Arc::clone(&x);
    let a = queue.submit(move || {
        thread::sleep(Duration::from_millis(100));
        xa.store(7, Ordering::Release);
    })?;
    queue.wait(a)?;

    let (xb, s) = (Arc::clone(&x), Arc::clone(&seen));
    let b = queue.submit_after(move || s.store(xb.load(Ordering::Acquire), Ordering::Release), [a])?;

    let queue = Arc::new(queue);
    let q = Arc::clone(&queue);
    within(Duration::from_secs(2), move || q.wait(b))?;

    assert_eq!(seen.load(Ordering::Acquire), 7);
    Ok(())
}

#[test]
fn late_dependent_sees_resized_vector() -> TestResult {
    init_tracing();

    let size = 1000;
    let v = Arc::new(Mutex::new(Vec::<i32>::new()));
    let ok = Arc::new(AtomicBool::new(false));

    let queue = TaskQueue::new()?;

    let va = Arc::clone(&v);
    let a = queue.submit(move || va.lock().unwrap().resize(size, 0))?;
    queue.wait(a)?;

    let (vb, okb) = (Arc::clone(&v), Arc::clone(&ok));
    queue.submit_after(move || okb.store(vb.lock().unwrap().len() == size, Ordering::Release), [a])?;
    queue.wait_all()?;

    assert!(ok.load(Ordering::Acquire));
    Ok(())
}

#[test]
fn chain_runs_in_submission_order() -> TestResult {
    init_tracing();

    let queue = TaskQueue::new()?;
    let rec = Recorder::new();

    let mut prev: Vec<Token> = Vec::new();
    for i in 0..20 {
        let t = rec.submit(&queue, &i.to_string(), &prev)?;
        prev = vec![t];
    }
    queue.wait_all()?;

    let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    assert_eq!(rec.events(), expected);
    Ok(())
}

#[test]
fn diamond_respects_both_edges() -> TestResult {
    init_tracing();

    let queue = TaskQueue::new()?;
    let rec = Recorder::new();

    let top = rec.submit(&queue, "top", &[])?;
    let left = rec.submit(&queue, "left", &[top])?;
    let right = rec.submit(&queue, "right", &[top])?;
    let bottom = rec.submit(&queue, "bottom", &[left, right])?;
    queue.wait(bottom)?;

    rec.assert_before("top", "left");
    rec.assert_before("top", "right");
    rec.assert_before("left", "bottom");
    rec.assert_before("right", "bottom");
    Ok(())
}

#[test]
fn wait_many_waits_for_each_token() -> TestResult {
    init_tracing();

    let queue = TaskQueue::new()?;
    let rec = Recorder::new();

    let tokens: Vec<Token> = (0..6)
        .map(|i| rec.submit(&queue, &format!("t{i}"), &[]))
        .collect::<Result<_, _>>()?;
    queue.wait_many(&tokens)?;

    assert_eq!(rec.events().len(), 6);
    queue.wait_many(&[])?;
    Ok(())
}

#[test]
fn task_can_submit_into_another_queue() -> TestResult {
    init_tracing();

    let outer = Arc::new(TaskQueue::new()?);
    let size = 1000;
    let v = Arc::new(Mutex::new(Vec::<i32>::new()));
    let inner_token: Arc<Mutex<Option<Token>>> = Arc::new(Mutex::new(None));
    let (release_tx, release_rx) = mpsc::channel::<()>();

    {
        let inner = TaskQueue::new()?;
        let (o, vv, slot) = (Arc::clone(&outer), Arc::clone(&v), Arc::clone(&inner_token));
        let t = inner.submit(move || {
            let token = o
                .submit(move || {
                    let _ = release_rx.recv();
                    vv.lock().unwrap().resize(size, 0);
                })
                .unwrap();
            *slot.lock().unwrap() = Some(token);
        })?;
        inner.wait(t)?;
    }

    // The inner queue is gone; the task it planted in `outer` is blocked.
    assert_ne!(v.lock().unwrap().len(), size);

    release_tx.send(())?;
    let token = inner_token.lock().unwrap().expect("inner task stored its token");
    outer.wait(token)?;

    assert_eq!(v.lock().unwrap().len(), size);
    Ok(())
}
