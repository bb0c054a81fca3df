//! Transactions.
//!
//! A transaction buffers writes privately and publishes them atomically on
//! commit:
//! - **Read-your-writes**: a transaction always sees its own pending writes
//! - **Isolation**: other handles never see uncommitted writes
//! - **Atomicity**: a commit is applied to the committed table all at once

mod state;

pub(crate) use state::{ActiveSet, Table};
pub use state::{PendingWrite, Transaction, TransactionState};
