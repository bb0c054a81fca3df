//! # txkv Core
//!
//! A transactional in-memory key-value store.
//!
//! This crate provides:
//! - An integer-keyed table of [`Record`]s
//! - Explicit transactions with commit and rollback
//! - Read-your-writes inside a transaction, invisibility outside it
//! - Serialized, atomic commits safe to call from many threads
//!
//! ## Example
//!
//! ```rust
//! use txkv_core::{Key, Record, Store};
//!
//! let store = Store::new();
//! store.seed([(Key::new(2), Record::enabled(false))]);
//!
//! let mut writer = store.begin();
//! let reader = store.begin();
//! store.write(&mut writer, Key::new(2), Record::enabled(true))?;
//!
//! // Not visible to another handle until commit.
//! assert_eq!(store.read(Some(&reader), Key::new(2))?, Some(Record::enabled(false)));
//!
//! store.commit(&mut writer)?;
//! assert_eq!(store.read(Some(&reader), Key::new(2))?, Some(Record::enabled(true)));
//! # Ok::<(), txkv_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod record;
mod stats;
mod store;
mod transaction;
mod types;

pub use config::{ReadPolicy, StoreConfig};
pub use error::{CoreError, CoreResult};
pub use record::{Record, Value};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::{CommitInfo, Store};
pub use transaction::{PendingWrite, Transaction, TransactionState};
pub use types::{Key, SequenceNumber, TransactionId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
