//! Error types for txkv core.

use crate::transaction::TransactionState;
use crate::types::TransactionId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in txkv core operations.
///
/// None of these leave the store unusable; they only describe why a single
/// operation on a single transaction was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The transaction is no longer active (already committed or rolled back).
    #[error("invalid transaction state: {txid} is {state}")]
    InvalidTransactionState {
        /// The transaction that was targeted.
        txid: TransactionId,
        /// The state it was found in.
        state: TransactionState,
    },

    /// The transaction was begun by a different store.
    #[error("foreign transaction: {txid} was not begun by this store")]
    ForeignTransaction {
        /// The transaction that was targeted.
        txid: TransactionId,
    },

    /// A transaction body asked for its transaction to be rolled back.
    #[error("transaction aborted: {reason}")]
    Aborted {
        /// Reason for abort.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid transaction state error.
    pub fn invalid_state(txid: TransactionId, state: TransactionState) -> Self {
        Self::InvalidTransactionState { txid, state }
    }

    /// Creates a foreign transaction error.
    pub fn foreign(txid: TransactionId) -> Self {
        Self::ForeignTransaction { txid }
    }

    /// Creates an aborted error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    /// Returns true if this error reports a closed transaction.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidTransactionState { .. })
    }

    /// Returns true if this error reports a transaction from another store.
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::ForeignTransaction { .. })
    }
}
