//! Test fixtures.
//!
//! The fixture table holds a single record, `{2: {enabled: false}}`. Every
//! scenario starts from it by calling [`FixtureStore::reset`].

use std::ops::Deref;
use std::sync::Arc;
use txkv_core::{Key, Record, Store, StoreConfig};

/// Key of the fixture record.
pub const FIXTURE_KEY: Key = Key::new(2);

/// Records loaded into the table before each scenario.
pub fn fixture_records() -> Vec<(Key, Record)> {
    vec![(FIXTURE_KEY, Record::enabled(false))]
}

/// A store pre-loaded with the fixture table.
///
/// Cloning shares the same underlying store.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    store: Arc<Store>,
}

impl FixtureStore {
    /// Creates a store with default configuration and loads the fixture.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store with the given configuration and loads the fixture.
    pub fn with_config(config: StoreConfig) -> Self {
        let fixture = Self {
            store: Arc::new(Store::with_config(config)),
        };
        fixture.reset();
        fixture
    }

    /// Restores the committed table to the fixture state.
    pub fn reset(&self) {
        self.store.reset(fixture_records());
    }

    /// Returns a shared handle to the store.
    pub fn shared(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for FixtureStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test against a freshly reset fixture store.
///
/// # Example
///
/// ```rust
/// use txkv_testkit::{with_fixture, FIXTURE_KEY};
///
/// with_fixture(|store| {
///     assert_eq!(store.get(FIXTURE_KEY).and_then(|r| r.is_enabled()), Some(false));
/// });
/// ```
pub fn with_fixture<F, R>(f: F) -> R
where
    F: FnOnce(&FixtureStore) -> R,
{
    let fixture = FixtureStore::new();
    f(&fixture)
}
