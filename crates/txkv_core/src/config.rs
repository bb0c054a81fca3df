//! Store configuration.

/// How a transaction resolves reads that miss its own write-set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Read the latest committed table at the time of each read.
    ///
    /// Commits made by other transactions become visible to this one as soon
    /// as they complete.
    #[default]
    LatestCommitted,
    /// Read the committed table as it was when the transaction began.
    Snapshot,
}

/// Configuration for creating a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Read policy given to transactions started with `Store::begin`.
    pub read_policy: ReadPolicy,

    /// Capacity hint for the committed table.
    pub initial_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            read_policy: ReadPolicy::LatestCommitted,
            initial_capacity: 16,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default read policy.
    #[must_use]
    pub const fn read_policy(mut self, policy: ReadPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    /// Sets the committed table capacity hint.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
