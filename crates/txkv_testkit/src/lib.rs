//! # txkv Testkit
//!
//! Test utilities for txkv.
//!
//! This crate provides:
//! - A fixture store reset to a known table before each scenario
//! - The visibility scenarios the store's contract is checked against
//! - Property-based test generators using proptest
//! - Concurrent stress runs
//!
//! ## Usage
//!
//! ```rust
//! use txkv_testkit::prelude::*;
//!
//! let fixture = FixtureStore::new();
//! let report = explicit_commit_is_visible(&fixture).unwrap();
//! assert_eq!(report.name, "explicit-commit");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod scenarios;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::scenarios::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use scenarios::{
    concurrent_handle_sees_commit, explicit_commit_is_visible, run_all,
    scoped_transaction_is_visible, uncommitted_update_is_invisible, Observation, Scenario,
    ScenarioError, ScenarioReport,
};
pub use stress::*;
