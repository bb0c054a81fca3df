//! The transactional store.

use crate::config::{ReadPolicy, StoreConfig};
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::stats::StoreStats;
use crate::transaction::{ActiveSet, PendingWrite, Table, Transaction};
use crate::types::{Key, SequenceNumber, TransactionId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Source of store identities, stamped on every transaction a store begins.
static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitInfo {
    /// The committed transaction.
    pub txid: TransactionId,
    /// Sequence assigned to the commit.
    pub sequence: SequenceNumber,
    /// Records inserted or replaced.
    pub puts_applied: usize,
    /// Keys removed.
    pub deletes_applied: usize,
}

/// An in-memory keyed table with explicit transactions.
///
/// The store owns the committed table and the registry of open
/// transactions. It provides:
/// - Read-your-writes inside a transaction
/// - Invisibility of uncommitted writes to every other handle
/// - Atomic, serialized commits
///
/// ## Visibility
///
/// A write made through one transaction is not seen by a plain
/// [`read`](Store::read) or by any other transaction until that transaction
/// commits. Transactions using [`ReadPolicy::LatestCommitted`] see other
/// transactions' commits as soon as they complete; transactions using
/// [`ReadPolicy::Snapshot`] keep seeing the table as of their `begin`.
///
/// ```rust
/// use txkv_core::{Key, Record, Store};
///
/// let store = Store::new();
/// store.seed([(Key::new(2), Record::enabled(false))]);
///
/// let mut txn = store.begin();
/// store.write(&mut txn, Key::new(2), Record::enabled(true))?;
/// assert_eq!(store.read(None, Key::new(2))?, Some(Record::enabled(false)));
///
/// store.commit(&mut txn)?;
/// assert_eq!(store.read(None, Key::new(2))?, Some(Record::enabled(true)));
/// # Ok::<(), txkv_core::CoreError>(())
/// ```
pub struct Store {
    /// Identity checked against each transaction handed back to the store.
    id: u64,
    /// Configuration.
    config: StoreConfig,
    /// Committed table. Replaced or mutated only under `commit_lock`.
    table: RwLock<Arc<Table>>,
    /// Serializes commits and table resets.
    commit_lock: Mutex<()>,
    /// Next transaction ID.
    next_txid: AtomicU64,
    /// Sequence of the last commit. Stored under the table write lock.
    committed_seq: AtomicU64,
    /// Active transactions. Shared with each handle so a drop can prune it.
    active_txns: Arc<ActiveSet>,
    /// Usage counters.
    stats: StoreStats,
}

impl Store {
    /// Creates an empty store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let table = Table::with_capacity(config.initial_capacity);
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            config,
            table: RwLock::new(Arc::new(table)),
            commit_lock: Mutex::new(()),
            next_txid: AtomicU64::new(1),
            committed_seq: AtomicU64::new(0),
            active_txns: Arc::new(ActiveSet::new(Vec::new())),
            stats: StoreStats::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Begins a transaction using the configured default read policy.
    pub fn begin(&self) -> Transaction {
        self.begin_with(self.config.read_policy)
    }

    /// Begins a transaction with an explicit read policy.
    pub fn begin_with(&self, policy: ReadPolicy) -> Transaction {
        let txid = TransactionId::new(self.next_txid.fetch_add(1, Ordering::SeqCst));
        let snapshot = match policy {
            ReadPolicy::Snapshot => Some(Arc::clone(&*self.table.read())),
            ReadPolicy::LatestCommitted => None,
        };

        self.active_txns.write().push(txid);
        self.stats.record_transaction_start();
        debug!(%txid, ?policy, "transaction started");

        Transaction::new(
            txid,
            self.id,
            Arc::downgrade(&self.active_txns),
            policy,
            snapshot,
        )
    }

    /// Buffers a write in the transaction's write-set.
    ///
    /// Nothing outside `txn` can see the record until [`commit`](Store::commit).
    pub fn write(&self, txn: &mut Transaction, key: Key, record: Record) -> CoreResult<()> {
        trace!(txid = %txn.id(), %key, "write");
        self.observe(self.ensure_owned(txn).and_then(|()| txn.put(key, record)))?;
        self.stats.record_write();
        Ok(())
    }

    /// Buffers a delete in the transaction's write-set.
    pub fn delete(&self, txn: &mut Transaction, key: Key) -> CoreResult<()> {
        trace!(txid = %txn.id(), %key, "delete");
        self.observe(self.ensure_owned(txn).and_then(|()| txn.delete(key)))?;
        self.stats.record_delete();
        Ok(())
    }

    /// Reads a record.
    ///
    /// With a transaction, its write-set is consulted first and the
    /// committed table second (per the transaction's read policy). Without
    /// one, only the committed table is read. A missing key is `Ok(None)`.
    pub fn read(&self, txn: Option<&Transaction>, key: Key) -> CoreResult<Option<Record>> {
        let Some(txn) = txn else {
            self.stats.record_read();
            return Ok(self.table.read().get(&key).cloned());
        };

        self.ensure_usable(txn)?;
        self.stats.record_read();
        trace!(txid = %txn.id(), %key, "read");

        if let Some(write) = txn.get_pending_write(key) {
            return Ok(write.record().cloned());
        }

        let record = match txn.snapshot() {
            Some(snapshot) => snapshot.get(&key).cloned(),
            None => self.table.read().get(&key).cloned(),
        };
        Ok(record)
    }

    /// Reads a record from the committed table.
    pub fn get(&self, key: Key) -> Option<Record> {
        self.stats.record_read();
        self.table.read().get(&key).cloned()
    }

    /// Commits a transaction.
    ///
    /// The write-set is merged into the committed table in one step: readers
    /// observe either none or all of it. Within the write-set the last write
    /// per key wins; across commits, the later commit wins.
    pub fn commit(&self, txn: &mut Transaction) -> CoreResult<CommitInfo> {
        let _commit_guard = self.commit_lock.lock();
        self.ensure_usable(txn)?;

        let txid = txn.id();
        let writes = txn.take_writes();
        let (puts_applied, deletes_applied, sequence) = self.apply(writes);

        self.active_txns.write().retain(|&id| id != txid);
        txn.mark_committed();

        self.stats
            .record_commit(puts_applied as u64, deletes_applied as u64);
        debug!(%txid, %sequence, puts_applied, deletes_applied, "transaction committed");

        Ok(CommitInfo {
            txid,
            sequence,
            puts_applied,
            deletes_applied,
        })
    }

    /// Rolls a transaction back, discarding its write-set.
    pub fn rollback(&self, txn: &mut Transaction) -> CoreResult<()> {
        self.ensure_usable(txn)?;

        let txid = txn.id();
        let discarded = txn.write_count();
        self.active_txns.write().retain(|&id| id != txid);
        txn.mark_rolled_back();

        self.stats.record_rollback();
        debug!(%txid, discarded, "transaction rolled back");
        Ok(())
    }

    /// Executes a function within a transaction.
    ///
    /// If the function returns `Ok`, the transaction is committed.
    /// If it returns `Err`, the transaction is rolled back and the error is
    /// returned.
    /// If it panics, the transaction is dropped with its writes unapplied.
    ///
    /// ```rust
    /// use txkv_core::{Key, Record, Store};
    ///
    /// let store = Store::new();
    /// store.transaction(|txn| txn.put(Key::new(2), Record::enabled(true)))?;
    /// assert_eq!(store.get(Key::new(2)), Some(Record::enabled(true)));
    /// # Ok::<(), txkv_core::CoreError>(())
    /// ```
    pub fn transaction<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction) -> CoreResult<T>,
    {
        let mut txn = self.begin();
        match f(&mut txn) {
            Ok(value) => {
                self.commit(&mut txn)?;
                Ok(value)
            }
            Err(err) => {
                self.rollback(&mut txn)?;
                Err(err)
            }
        }
    }

    /// Inserts records directly into the committed table.
    ///
    /// This bypasses transactions and does not advance the commit sequence.
    /// It is meant for loading fixture state.
    pub fn seed<I>(&self, records: I)
    where
        I: IntoIterator<Item = (Key, Record)>,
    {
        let _commit_guard = self.commit_lock.lock();
        let mut table = self.table.write();
        Arc::make_mut(&mut *table).extend(records);
        debug!(len = table.len(), "table seeded");
    }

    /// Replaces the committed table with exactly `records`.
    ///
    /// Open transactions are untouched: their write-sets survive, and
    /// snapshot transactions keep the table they started with.
    pub fn reset<I>(&self, records: I)
    where
        I: IntoIterator<Item = (Key, Record)>,
    {
        let _commit_guard = self.commit_lock.lock();
        let mut fresh = Table::with_capacity(self.config.initial_capacity);
        fresh.extend(records);
        debug!(len = fresh.len(), "table reset");
        *self.table.write() = Arc::new(fresh);
    }

    /// Returns the sequence of the most recent commit (0 before any commit).
    #[must_use]
    pub fn committed_seq(&self) -> SequenceNumber {
        SequenceNumber::new(self.committed_seq.load(Ordering::SeqCst))
    }

    /// Returns the number of active transactions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_txns.read().len()
    }

    /// Returns the number of committed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Returns true if the committed table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Returns the store's usage counters.
    #[must_use]
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Merges a write-set into the committed table and publishes the next
    /// commit sequence before the table lock is released. Caller holds
    /// `commit_lock`.
    fn apply(&self, writes: HashMap<Key, PendingWrite>) -> (usize, usize, SequenceNumber) {
        let mut puts = 0;
        let mut deletes = 0;
        let mut guard = self.table.write();
        if !writes.is_empty() {
            // Clones the map only while a snapshot transaction still holds it.
            let table = Arc::make_mut(&mut *guard);
            for (key, write) in writes {
                match write {
                    PendingWrite::Put(record) => {
                        table.insert(key, record);
                        puts += 1;
                    }
                    PendingWrite::Delete => {
                        if table.remove(&key).is_some() {
                            deletes += 1;
                        }
                    }
                }
            }
        }

        let sequence = SequenceNumber::new(self.committed_seq.load(Ordering::SeqCst)).next();
        self.committed_seq.store(sequence.as_u64(), Ordering::SeqCst);
        drop(guard);
        (puts, deletes, sequence)
    }

    fn ensure_owned(&self, txn: &Transaction) -> CoreResult<()> {
        if txn.store_id() == self.id {
            Ok(())
        } else {
            Err(CoreError::foreign(txn.id()))
        }
    }

    /// Checks that `txn` belongs to this store and is still active.
    fn ensure_usable(&self, txn: &Transaction) -> CoreResult<()> {
        self.observe(self.ensure_owned(txn).and_then(|()| txn.ensure_active()))
    }

    fn observe<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        match &result {
            Err(CoreError::InvalidTransactionState { txid, state }) => {
                self.stats.record_invalid_state();
                debug!(%txid, %state, "operation on closed transaction refused");
            }
            Err(CoreError::ForeignTransaction { txid }) => {
                debug!(%txid, store = self.id, "transaction from another store refused");
            }
            _ => {}
        }
        result
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("committed_seq", &self.committed_seq())
            .field("active_count", &self.active_count())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionState;

    fn seeded_store() -> Store {
        let store = Store::new();
        store.seed([(Key::new(2), Record::enabled(false))]);
        store
    }

    #[test]
    fn begin_creates_transaction() {
        let store = Store::new();
        let txn = store.begin();
        assert!(txn.is_active());
        assert_eq!(txn.read_policy(), ReadPolicy::LatestCommitted);
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn begin_has_no_side_effects_on_table() {
        let store = seeded_store();
        let _txn = store.begin();
        assert_eq!(store.len(), 1);
        assert_eq!(store.committed_seq().as_u64(), 0);
    }

    #[test]
    fn transaction_ids_are_unique() {
        let store = Store::new();
        let a = store.begin();
        let b = store.begin();
        assert!(a.id() < b.id());
    }

    #[test]
    fn commit_empty_transaction() {
        let store = Store::new();
        let mut txn = store.begin();
        let info = store.commit(&mut txn).unwrap();
        assert_eq!(info.sequence.as_u64(), 1);
        assert_eq!(info.puts_applied, 0);
        assert_eq!(txn.state(), TransactionState::Committed);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn rollback_transaction() {
        let store = Store::new();
        let mut txn = store.begin();
        store.rollback(&mut txn).unwrap();
        assert_eq!(txn.state(), TransactionState::RolledBack);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn read_your_own_writes() {
        let store = seeded_store();
        let mut txn = store.begin();
        store
            .write(&mut txn, Key::new(2), Record::enabled(true))
            .unwrap();

        let seen = store.read(Some(&txn), Key::new(2)).unwrap();
        assert_eq!(seen, Some(Record::enabled(true)));
    }

    #[test]
    fn read_falls_through_to_committed_table() {
        let store = seeded_store();
        let txn = store.begin();
        let seen = store.read(Some(&txn), Key::new(2)).unwrap();
        assert_eq!(seen, Some(Record::enabled(false)));
    }

    #[test]
    fn read_missing_key_is_none() {
        let store = seeded_store();
        let txn = store.begin();
        assert_eq!(store.read(Some(&txn), Key::new(99)).unwrap(), None);
        assert_eq!(store.read(None, Key::new(99)).unwrap(), None);
    }

    #[test]
    fn uncommitted_write_invisible_to_plain_read() {
        let store = seeded_store();
        let mut txn = store.begin();
        store
            .write(&mut txn, Key::new(2), Record::enabled(true))
            .unwrap();

        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(false)));

        store.commit(&mut txn).unwrap();
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(true)));
    }

    #[test]
    fn latest_committed_reader_sees_other_commit() {
        let store = seeded_store();
        let mut writer = store.begin();
        let reader = store.begin();

        store
            .write(&mut writer, Key::new(2), Record::enabled(true))
            .unwrap();
        assert_eq!(
            store.read(Some(&reader), Key::new(2)).unwrap(),
            Some(Record::enabled(false))
        );

        store.commit(&mut writer).unwrap();
        assert_eq!(
            store.read(Some(&reader), Key::new(2)).unwrap(),
            Some(Record::enabled(true))
        );
    }

    #[test]
    fn snapshot_reader_keeps_begin_state() {
        let store = seeded_store();
        let reader = store.begin_with(ReadPolicy::Snapshot);

        store
            .transaction(|txn| txn.put(Key::new(2), Record::enabled(true)))
            .unwrap();

        assert_eq!(
            store.read(Some(&reader), Key::new(2)).unwrap(),
            Some(Record::enabled(false))
        );
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(true)));
    }

    #[test]
    fn snapshot_policy_from_config() {
        let store = Store::with_config(StoreConfig::new().read_policy(ReadPolicy::Snapshot));
        let txn = store.begin();
        assert_eq!(txn.read_policy(), ReadPolicy::Snapshot);
    }

    #[test]
    fn rolled_back_writes_never_visible() {
        let store = seeded_store();
        let mut txn = store.begin();
        store
            .write(&mut txn, Key::new(2), Record::enabled(true))
            .unwrap();
        store
            .write(&mut txn, Key::new(3), Record::enabled(true))
            .unwrap();
        store.rollback(&mut txn).unwrap();

        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(false)));
        assert_eq!(store.get(Key::new(3)), None);
        let other = store.begin();
        assert_eq!(store.read(Some(&other), Key::new(3)).unwrap(), None);
    }

    #[test]
    fn delete_removes_key_on_commit() {
        let store = seeded_store();
        let mut txn = store.begin();
        store.delete(&mut txn, Key::new(2)).unwrap();

        assert_eq!(store.read(Some(&txn), Key::new(2)).unwrap(), None);
        assert!(store.get(Key::new(2)).is_some());

        let info = store.commit(&mut txn).unwrap();
        assert_eq!(info.deletes_applied, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn later_commit_wins() {
        let store = seeded_store();
        let mut first = store.begin();
        let mut second = store.begin();
        store
            .write(&mut first, Key::new(2), Record::enabled(true))
            .unwrap();
        store
            .write(&mut second, Key::new(2), Record::enabled(false).with("n", 2i64))
            .unwrap();

        store.commit(&mut second).unwrap();
        store.commit(&mut first).unwrap();
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(true)));
    }

    #[test]
    fn cannot_commit_twice() {
        let store = Store::new();
        let mut txn = store.begin();
        store.commit(&mut txn).unwrap();

        let err = store.commit(&mut txn).unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(store.committed_seq().as_u64(), 1);
    }

    #[test]
    fn cannot_rollback_twice() {
        let store = Store::new();
        let mut txn = store.begin();
        store.rollback(&mut txn).unwrap();
        assert!(store.rollback(&mut txn).unwrap_err().is_invalid_state());
    }

    #[test]
    fn cannot_rollback_after_commit() {
        let store = Store::new();
        let mut txn = store.begin();
        store.commit(&mut txn).unwrap();
        assert!(store.rollback(&mut txn).unwrap_err().is_invalid_state());
    }

    #[test]
    fn closed_transaction_refuses_write_and_read() {
        let store = seeded_store();
        let mut txn = store.begin();
        store.commit(&mut txn).unwrap();

        assert!(store
            .write(&mut txn, Key::new(2), Record::enabled(true))
            .unwrap_err()
            .is_invalid_state());
        assert!(store.delete(&mut txn, Key::new(2)).unwrap_err().is_invalid_state());
        assert!(store
            .read(Some(&txn), Key::new(2))
            .unwrap_err()
            .is_invalid_state());
        assert_eq!(store.stats().invalid_state_errors(), 3);

        // The store itself is still usable.
        let mut next = store.begin();
        store
            .write(&mut next, Key::new(2), Record::enabled(true))
            .unwrap();
        store.commit(&mut next).unwrap();
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(true)));
    }

    #[test]
    fn transaction_closure_commits_on_ok() {
        let store = seeded_store();
        let value = store
            .transaction(|txn| {
                txn.put(Key::new(2), Record::enabled(true))?;
                Ok(7)
            })
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(true)));
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn transaction_closure_rolls_back_on_err() {
        let store = seeded_store();
        let err = store
            .transaction(|txn| -> CoreResult<()> {
                txn.put(Key::new(2), Record::enabled(true))?;
                Err(CoreError::aborted("changed my mind"))
            })
            .unwrap_err();

        assert_eq!(err, CoreError::aborted("changed my mind"));
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(false)));
        assert_eq!(store.stats().transactions_rolled_back(), 1);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn reset_replaces_table() {
        let store = seeded_store();
        store
            .transaction(|txn| txn.put(Key::new(5), Record::enabled(true)))
            .unwrap();
        assert_eq!(store.len(), 2);

        store.reset([(Key::new(2), Record::enabled(false))]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(Key::new(5)), None);
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(false)));
    }

    #[test]
    fn sequence_numbers_increase() {
        let store = Store::new();

        let mut txn1 = store.begin();
        let seq1 = store.commit(&mut txn1).unwrap().sequence;

        let mut txn2 = store.begin();
        let seq2 = store.commit(&mut txn2).unwrap().sequence;

        assert!(seq2 > seq1);
        assert_eq!(store.committed_seq(), seq2);
    }

    #[test]
    fn stats_track_lifecycle() {
        let store = seeded_store();
        let mut a = store.begin();
        let mut b = store.begin();
        store.write(&mut a, Key::new(1), Record::enabled(true)).unwrap();
        store.delete(&mut a, Key::new(2)).unwrap();
        store.commit(&mut a).unwrap();
        store.rollback(&mut b).unwrap();

        let snap = store.stats().snapshot();
        assert_eq!(snap.transactions_started, 2);
        assert_eq!(snap.transactions_committed, 1);
        assert_eq!(snap.transactions_rolled_back, 1);
        assert_eq!(snap.records_committed, 1);
        assert_eq!(snap.deletes_committed, 1);
        assert_eq!(snap.writes, 1);
        assert_eq!(snap.deletes, 1);
    }

    #[test]
    fn stats_count_writes_that_are_rolled_back() {
        let store = seeded_store();
        let mut txn = store.begin();
        store.write(&mut txn, Key::new(1), Record::enabled(true)).unwrap();
        store.write(&mut txn, Key::new(1), Record::enabled(false)).unwrap();
        store.delete(&mut txn, Key::new(2)).unwrap();
        store.rollback(&mut txn).unwrap();

        // Refused operations are not counted.
        assert!(store.write(&mut txn, Key::new(1), Record::new()).is_err());
        assert!(store.delete(&mut txn, Key::new(1)).is_err());

        let snap = store.stats().snapshot();
        assert_eq!(snap.writes, 2);
        assert_eq!(snap.deletes, 1);
        assert_eq!(snap.records_committed, 0);
        assert_eq!(snap.deletes_committed, 0);
    }

    #[test]
    fn transaction_from_another_store_is_refused() {
        let a = seeded_store();
        let b = seeded_store();
        let mut txn = a.begin();
        a.write(&mut txn, Key::new(2), Record::enabled(true)).unwrap();

        assert!(b.commit(&mut txn).unwrap_err().is_foreign());
        assert!(b.rollback(&mut txn).unwrap_err().is_foreign());
        assert!(b
            .write(&mut txn, Key::new(3), Record::enabled(true))
            .unwrap_err()
            .is_foreign());
        assert!(b.delete(&mut txn, Key::new(2)).unwrap_err().is_foreign());
        assert!(b.read(Some(&txn), Key::new(2)).unwrap_err().is_foreign());

        // Neither store nor handle was touched.
        assert_eq!(b.get(Key::new(2)), Some(Record::enabled(false)));
        assert_eq!(b.committed_seq().as_u64(), 0);
        assert_eq!(b.stats().writes(), 0);
        assert!(txn.is_active());
        assert_eq!(txn.write_count(), 1);
        assert_eq!(a.active_count(), 1);

        a.commit(&mut txn).unwrap();
        assert_eq!(a.get(Key::new(2)), Some(Record::enabled(true)));
        assert_eq!(a.active_count(), 0);
    }

    #[test]
    fn closed_transaction_from_another_store_is_foreign() {
        let a = Store::new();
        let b = Store::new();
        let mut txn = a.begin();
        a.commit(&mut txn).unwrap();

        assert!(b.commit(&mut txn).unwrap_err().is_foreign());
        assert_eq!(b.stats().invalid_state_errors(), 0);
    }

    #[test]
    fn dropping_active_transaction_unregisters_it() {
        let store = seeded_store();
        let mut txn = store.begin();
        store
            .write(&mut txn, Key::new(2), Record::enabled(true))
            .unwrap();
        let _kept = store.begin();
        assert_eq!(store.active_count(), 2);

        drop(txn);
        assert_eq!(store.active_count(), 1);
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(false)));
    }

    #[test]
    fn early_return_leaves_nothing_active() {
        fn update_twice(store: &Store) -> CoreResult<()> {
            let mut txn = store.begin();
            store.write(&mut txn, Key::new(2), Record::enabled(true))?;
            store.commit(&mut txn)?;

            let mut retry = store.begin();
            store.write(&mut txn, Key::new(3), Record::enabled(true))?;
            store.commit(&mut retry)?;
            Ok(())
        }

        let store = seeded_store();
        assert!(update_twice(&store).unwrap_err().is_invalid_state());
        assert_eq!(store.active_count(), 0);
        assert_eq!(store.get(Key::new(3)), None);
    }

    #[test]
    fn panic_in_transaction_closure_leaves_nothing_active() {
        let store = seeded_store();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.transaction(|txn| -> CoreResult<()> {
                txn.put(Key::new(2), Record::enabled(true))?;
                panic!("transaction body failed");
            })
        }));

        assert!(result.is_err());
        assert_eq!(store.active_count(), 0);
        assert_eq!(store.get(Key::new(2)), Some(Record::enabled(false)));
    }

    #[test]
    fn empty_commit_still_publishes_sequence() {
        let store = Store::new();
        let snapshot = store.begin_with(ReadPolicy::Snapshot);
        let mut txn = store.begin();
        let info = store.commit(&mut txn).unwrap();

        assert_eq!(info.sequence, store.committed_seq());
        assert!(store.read(Some(&snapshot), Key::new(1)).unwrap().is_none());
    }
}
