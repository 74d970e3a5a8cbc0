//! Integration tests for the worker pool

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use workpool::prelude::*;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_join_blocks_until_all_workers_exit() {
    init_logs();
    let pool = WorkerPool::new(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    // Keep every worker busy so join actually has to wait.
    for _ in 0..8 {
        let c = Arc::clone(&counter);
        pool.dispatch(move || {
            thread::sleep(Duration::from_millis(30));
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    pool.join().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 8);
    assert_eq!(pool.thread_count(), 0);
    assert!(pool.worker_ids().is_empty());
}

#[test]
fn test_dispatch_with_invokes_exactly_once_with_args() {
    let pool = WorkerPool::new(2).unwrap();
    let (tx, rx) = mpsc::channel();

    pool.dispatch_with(
        move |(a, b, c)| {
            tx.send((a, b, c)).ok();
            Ok(())
        },
        (1, "two".to_string(), 3.5),
    );

    let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(received, (1, "two".to_string(), 3.5));
    // Exactly once: the sender was moved into the job, so a second
    // invocation is impossible; confirm no stray message anyway.
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    pool.join().unwrap();
}

#[test]
fn test_resize_cycles_do_not_deadlock() {
    let pool = WorkerPool::new(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    for round in 0..10 {
        pool.increment(5).unwrap();
        for _ in 0..20 {
            let c = Arc::clone(&counter);
            pool.dispatch(move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        pool.decrement(5);
        assert_eq!(pool.thread_count(), 1, "round {}", round);
    }

    pool.join().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 200);
    assert_eq!(pool.thread_count(), 0);
}

#[test]
fn test_custom_job_type() {
    struct CountingJob {
        counter: Arc<AtomicUsize>,
    }

    impl Job for CountingJob {
        fn execute(self: Box<Self>) -> Result<()> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn job_type(&self) -> &str {
            "CountingJob"
        }
    }

    let pool = WorkerPool::new(2).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        pool.submit(CountingJob {
            counter: Arc::clone(&counter),
        });
    }
    pool.join().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn test_panicking_job_leaves_capacity_stale() {
    init_logs();
    let pool = WorkerPool::new(2).unwrap();

    pool.dispatch(|| panic!("intentional panic for testing"));
    thread::sleep(Duration::from_millis(50));

    // Bookkeeping is deliberately not reconciled after a worker dies.
    assert_eq!(pool.thread_count(), 2);

    // join still reaps every handle and reports the panic.
    assert!(pool.join().is_err());
    assert_eq!(pool.thread_count(), 0);
}

#[test]
fn test_pool_feeding_serial_executor_stays_serial() {
    let pool = WorkerPool::new(4).unwrap();
    let executor = Arc::new(SerialExecutor::new().unwrap());

    let executed = Arc::new(AtomicUsize::new(0));
    let in_progress = Arc::new(AtomicBool::new(false));
    let overlapped = Arc::new(AtomicBool::new(false));

    for _ in 0..40 {
        let executor = Arc::clone(&executor);
        let executed = Arc::clone(&executed);
        let in_progress = Arc::clone(&in_progress);
        let overlapped = Arc::clone(&overlapped);
        pool.dispatch(move || {
            executor
                .dispatch(move || {
                    if in_progress.swap(true, Ordering::SeqCst) {
                        overlapped.store(true, Ordering::SeqCst);
                    }
                    executed.fetch_add(1, Ordering::SeqCst);
                    in_progress.store(false, Ordering::SeqCst);
                    Ok(())
                })
                .ok();
            Ok(())
        });
    }

    pool.join().unwrap();
    executor.join().unwrap();
    assert_eq!(executed.load(Ordering::SeqCst), 40);
    assert!(!overlapped.load(Ordering::SeqCst));
}
