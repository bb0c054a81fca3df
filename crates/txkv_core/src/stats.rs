//! Store statistics.
//!
//! Counters for monitoring how a store is used. All counters are atomic and
//! can be read while operations are in progress.
//!
//! # Usage
//!
//! ```rust
//! use txkv_core::{Key, Record, Store};
//!
//! let store = Store::new();
//! let mut txn = store.begin();
//! store.write(&mut txn, Key::new(1), Record::enabled(true)).unwrap();
//! store.commit(&mut txn).unwrap();
//!
//! let stats = store.stats().snapshot();
//! assert_eq!(stats.transactions_committed, 1);
//! assert_eq!(stats.writes, 1);
//! assert_eq!(stats.records_committed, 1);
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics.
///
/// Values are monotonically increasing.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Reads answered by the store.
    reads: AtomicU64,
    /// Writes buffered in transactions.
    writes: AtomicU64,
    /// Deletes buffered in transactions.
    deletes: AtomicU64,
    /// Records written into the committed table by commits.
    records_committed: AtomicU64,
    /// Keys removed from the committed table by commits.
    deletes_committed: AtomicU64,

    transactions_started: AtomicU64,
    transactions_committed: AtomicU64,
    transactions_rolled_back: AtomicU64,

    /// Operations refused because the transaction was closed.
    invalid_state_errors: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    // === Increment methods (internal use) ===

    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self, records: u64, deletes: u64) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
        self.records_committed.fetch_add(records, Ordering::Relaxed);
        self.deletes_committed.fetch_add(deletes, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_start(&self) {
        self.transactions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rollback(&self) {
        self.transactions_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid_state(&self) {
        self.invalid_state_errors.fetch_add(1, Ordering::Relaxed);
    }

    // === Getter methods (public API) ===

    /// Returns the total number of reads.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of writes buffered, committed or not.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of deletes buffered, committed or not.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of records written by commits.
    pub fn records_committed(&self) -> u64 {
        self.records_committed.load(Ordering::Relaxed)
    }

    /// Returns the number of keys deleted by commits.
    pub fn deletes_committed(&self) -> u64 {
        self.deletes_committed.load(Ordering::Relaxed)
    }

    /// Returns the total number of transactions started.
    pub fn transactions_started(&self) -> u64 {
        self.transactions_started.load(Ordering::Relaxed)
    }

    /// Returns the total number of transactions committed.
    pub fn transactions_committed(&self) -> u64 {
        self.transactions_committed.load(Ordering::Relaxed)
    }

    /// Returns the total number of transactions rolled back.
    pub fn transactions_rolled_back(&self) -> u64 {
        self.transactions_rolled_back.load(Ordering::Relaxed)
    }

    /// Returns the number of operations refused on closed transactions.
    pub fn invalid_state_errors(&self) -> u64 {
        self.invalid_state_errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            deletes: self.deletes(),
            records_committed: self.records_committed(),
            deletes_committed: self.deletes_committed(),
            transactions_started: self.transactions_started(),
            transactions_committed: self.transactions_committed(),
            transactions_rolled_back: self.transactions_rolled_back(),
            invalid_state_errors: self.invalid_state_errors(),
        }
    }
}

/// A point-in-time copy of [`StoreStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Total number of reads.
    pub reads: u64,
    /// Writes buffered in transactions.
    pub writes: u64,
    /// Deletes buffered in transactions.
    pub deletes: u64,
    /// Records written by commits.
    pub records_committed: u64,
    /// Keys deleted by commits.
    pub deletes_committed: u64,
    /// Transactions started.
    pub transactions_started: u64,
    /// Transactions committed.
    pub transactions_committed: u64,
    /// Transactions rolled back.
    pub transactions_rolled_back: u64,
    /// Operations refused on closed transactions.
    pub invalid_state_errors: u64,
}
