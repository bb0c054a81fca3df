//! CLI error types.

use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// No scenario has the requested name.
    #[error("unknown scenario '{name}' (available: {available})")]
    UnknownScenario {
        /// Requested name.
        name: String,
        /// Comma-separated list of known scenarios.
        available: String,
    },

    /// One or more scenarios did not meet their expectations.
    #[error("{failed} of {total} scenario(s) failed")]
    ScenariosFailed {
        /// Number of failed scenarios.
        failed: usize,
        /// Number of scenarios run.
        total: usize,
    },

    /// The stress run saw failures or torn reads.
    #[error("stress run not clean: {failed} failed operation(s), {torn} torn read(s)")]
    StressFailed {
        /// Failed operations.
        failed: usize,
        /// Torn reads.
        torn: usize,
    },

    /// Argument out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
