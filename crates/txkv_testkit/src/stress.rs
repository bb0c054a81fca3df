//! Stress runs.
//!
//! These exercise the store from many threads at once and check that
//! readers never observe a partially applied commit.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use txkv_core::{Key, ReadPolicy, Record, Store, Value};

/// Pair of keys that every stress commit writes together.
const PAIR: (Key, Key) = (Key::new(1_000), Key::new(1_001));

/// Result of a stress run.
#[derive(Debug, Clone, Serialize)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Reads that saw the two halves of a commit disagree.
    pub torn_reads: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, torn_reads: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            torn_reads,
            duration,
            ops_per_second,
        }
    }

    /// Returns true if nothing failed and no torn read was seen.
    pub fn is_clean(&self) -> bool {
        self.failed_ops == 0 && self.torn_reads == 0
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of writer threads; the same number of readers is started.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
        }
    }
}

/// Commits transactions one after another, each writing a distinct key.
pub fn stress_sequential_writes(store: &Store, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let record = Record::new().with("n", i as i64);
        match store.transaction(|txn| txn.put(Key::new(i as u64), record)) {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, 0, start.elapsed())
}

/// Runs writer threads that commit both keys of a pair with the same value,
/// alongside snapshot readers that check the pair always agrees.
pub fn stress_concurrent_commits(store: Arc<Store>, config: &StressConfig) -> StressTestResult {
    store.seed([
        (PAIR.0, Record::new().with("n", 0i64)),
        (PAIR.1, Record::new().with("n", 0i64)),
    ]);

    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let torn = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(config.threads * 2));
    let start = Instant::now();

    let mut handles = Vec::with_capacity(config.threads * 2);
    for t in 0..config.threads {
        let operations = config.operations;

        let store_w = Arc::clone(&store);
        let ok = Arc::clone(&successful);
        let bad = Arc::clone(&failed);
        let gate = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            gate.wait();
            for i in 0..operations {
                let n = (t * operations + i) as i64;
                let result = store_w.transaction(|txn| {
                    txn.put(PAIR.0, Record::new().with("n", n))?;
                    txn.put(PAIR.1, Record::new().with("n", n))
                });
                match result {
                    Ok(()) => ok.fetch_add(1, Ordering::Relaxed),
                    Err(_) => bad.fetch_add(1, Ordering::Relaxed),
                };
            }
        }));

        let store_r = Arc::clone(&store);
        let ok = Arc::clone(&successful);
        let bad = Arc::clone(&failed);
        let torn = Arc::clone(&torn);
        let gate = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            gate.wait();
            for _ in 0..operations {
                let mut reader = store_r.begin_with(ReadPolicy::Snapshot);
                let pair = (
                    store_r.read(Some(&reader), PAIR.0),
                    store_r.read(Some(&reader), PAIR.1),
                );
                let closed = store_r.rollback(&mut reader);
                match (pair, closed) {
                    ((Ok(a), Ok(b)), Ok(())) => {
                        if field_n(a.as_ref()) != field_n(b.as_ref()) {
                            torn.fetch_add(1, Ordering::Relaxed);
                        }
                        ok.fetch_add(1, Ordering::Relaxed);
                    }
                    _ => {
                        bad.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }));
    }

    for handle in handles {
        if handle.join().is_err() {
            failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    let result = StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        torn.load(Ordering::Relaxed),
        start.elapsed(),
    );
    debug!(?result, "concurrent commit stress finished");
    result
}

fn field_n(record: Option<&Record>) -> Option<i64> {
    record.and_then(|r| r.get("n")).and_then(Value::as_int)
}
