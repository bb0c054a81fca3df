//! Transaction state.

use crate::config::ReadPolicy;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::types::{Key, TransactionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Committed key/record mapping.
pub(crate) type Table = HashMap<Key, Record>;

/// IDs of a store's open transactions.
pub(crate) type ActiveSet = RwLock<Vec<TransactionId>>;

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can perform operations.
    Active,
    /// Transaction has been committed.
    Committed,
    /// Transaction has been rolled back.
    RolledBack,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
        })
    }
}

/// Represents a pending write in a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    /// Insert or replace a record.
    Put(Record),
    /// Remove the key.
    Delete,
}

impl PendingWrite {
    /// Returns the record this write would leave behind, if any.
    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Put(record) => Some(record),
            Self::Delete => None,
        }
    }
}

/// A transaction handle.
///
/// Writes are buffered in a private write-set and are only visible through
/// this handle until the transaction is committed. The handle is owned by
/// the caller; the store only tracks its ID. Only the store that began a
/// transaction accepts it.
///
/// Dropping an active transaction discards its write-set and removes it from
/// [`Store::active_count`](crate::Store::active_count). It is not counted as
/// a rollback.
#[derive(Debug)]
pub struct Transaction {
    /// Transaction ID.
    id: TransactionId,
    /// Identity of the store that began this transaction.
    store_id: u64,
    /// The owning store's active set, pruned on drop.
    registry: Weak<ActiveSet>,
    /// Current state.
    state: TransactionState,
    /// How reads that miss the write-set are resolved.
    policy: ReadPolicy,
    /// Committed table captured at begin (`ReadPolicy::Snapshot` only).
    snapshot: Option<Arc<Table>>,
    /// Pending writes.
    writes: HashMap<Key, PendingWrite>,
}

impl Transaction {
    /// Creates a new transaction.
    pub(crate) fn new(
        id: TransactionId,
        store_id: u64,
        registry: Weak<ActiveSet>,
        policy: ReadPolicy,
        snapshot: Option<Arc<Table>>,
    ) -> Self {
        Self {
            id,
            store_id,
            registry,
            state: TransactionState::Active,
            policy,
            snapshot,
            writes: HashMap::new(),
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns the read policy.
    #[must_use]
    pub fn read_policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Checks if the transaction is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Records a put, replacing any earlier pending write for the key.
    pub fn put(&mut self, key: Key, record: Record) -> CoreResult<()> {
        self.ensure_active()?;
        self.writes.insert(key, PendingWrite::Put(record));
        Ok(())
    }

    /// Records a delete, replacing any earlier pending write for the key.
    pub fn delete(&mut self, key: Key) -> CoreResult<()> {
        self.ensure_active()?;
        self.writes.insert(key, PendingWrite::Delete);
        Ok(())
    }

    /// Gets the pending write for a key.
    #[must_use]
    pub fn get_pending_write(&self, key: Key) -> Option<&PendingWrite> {
        self.writes.get(&key)
    }

    /// Returns all pending writes.
    pub fn pending_writes(&self) -> impl Iterator<Item = (&Key, &PendingWrite)> {
        self.writes.iter()
    }

    /// Returns the number of pending writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    pub(crate) fn store_id(&self) -> u64 {
        self.store_id
    }

    pub(crate) fn snapshot(&self) -> Option<&Arc<Table>> {
        self.snapshot.as_ref()
    }

    /// Moves the write-set out, leaving it empty.
    pub(crate) fn take_writes(&mut self) -> HashMap<Key, PendingWrite> {
        std::mem::take(&mut self.writes)
    }

    pub(crate) fn mark_committed(&mut self) {
        self.state = TransactionState::Committed;
        self.snapshot = None;
    }

    pub(crate) fn mark_rolled_back(&mut self) {
        self.state = TransactionState::RolledBack;
        self.writes.clear();
        self.snapshot = None;
    }

    /// Ensures the transaction is active.
    pub(crate) fn ensure_active(&self) -> CoreResult<()> {
        match self.state {
            TransactionState::Active => Ok(()),
            state => Err(CoreError::invalid_state(self.id, state)),
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.write().retain(|&id| id != self.id);
            debug!(txid = %self.id, discarded = self.writes.len(), "active transaction dropped");
        }
    }
}
