//! Visibility scenarios.
//!
//! Each scenario resets the fixture, performs an update of the fixture
//! record through one handle, and checks what a second, independent reader
//! observes. The expected outcomes encode the store's contract: a reader
//! outside the writing transaction sees the update only after it commits.

use crate::fixtures::{FixtureStore, FIXTURE_KEY};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use txkv_core::{CoreError, Record};

/// Errors raised while running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The store refused an operation.
    #[error("store error: {0}")]
    Core(#[from] CoreError),

    /// A read did not return what the contract requires.
    #[error("{scenario}: {step}: expected {expected:?}, got {actual:?}")]
    Mismatch {
        /// Scenario name.
        scenario: &'static str,
        /// Step that failed.
        step: &'static str,
        /// Expected `enabled` flag (`None` means absent).
        expected: Option<bool>,
        /// Observed `enabled` flag.
        actual: Option<bool>,
    },
}

/// A single checked read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// What was read and by whom.
    pub step: &'static str,
    /// The `enabled` flag that was read.
    pub enabled: Option<bool>,
}

/// Result of a scenario that met every expectation.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Reads performed, in order.
    pub observations: Vec<Observation>,
}

/// A runnable scenario.
pub type Scenario = fn(&FixtureStore) -> Result<ScenarioReport, ScenarioError>;

/// All scenarios, in the order they are usually run.
pub const ALL: &[(&str, Scenario)] = &[
    ("uncommitted-update", uncommitted_update_is_invisible),
    ("explicit-commit", explicit_commit_is_visible),
    ("scoped-transaction", scoped_transaction_is_visible),
    ("concurrent-handles", concurrent_handle_sees_commit),
];

struct Recorder {
    name: &'static str,
    description: &'static str,
    observations: Vec<Observation>,
}

impl Recorder {
    fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            observations: Vec::new(),
        }
    }

    fn check(
        &mut self,
        step: &'static str,
        expected: bool,
        actual: Option<Record>,
    ) -> Result<(), ScenarioError> {
        let enabled = actual.as_ref().and_then(Record::is_enabled);
        if enabled != Some(expected) {
            return Err(ScenarioError::Mismatch {
                scenario: self.name,
                step,
                expected: Some(expected),
                actual: enabled,
            });
        }
        self.observations.push(Observation { step, enabled });
        Ok(())
    }

    fn finish(self) -> ScenarioReport {
        info!(scenario = self.name, reads = self.observations.len(), "scenario passed");
        ScenarioReport {
            name: self.name,
            description: self.description,
            observations: self.observations,
        }
    }
}

/// An update left uncommitted is seen by its writer but not by a separate
/// reader of the committed table.
pub fn uncommitted_update_is_invisible(
    fixture: &FixtureStore,
) -> Result<ScenarioReport, ScenarioError> {
    fixture.reset();
    let mut rec = Recorder::new(
        "uncommitted-update",
        "update without commit is invisible to a separate reader",
    );

    let mut writer = fixture.begin();
    fixture.write(&mut writer, FIXTURE_KEY, Record::enabled(true))?;

    rec.check(
        "separate reader before commit",
        false,
        fixture.read(None, FIXTURE_KEY)?,
    )?;
    rec.check(
        "writer reads its own update",
        true,
        fixture.read(Some(&writer), FIXTURE_KEY)?,
    )?;

    fixture.rollback(&mut writer)?;
    rec.check(
        "separate reader after rollback",
        false,
        fixture.read(None, FIXTURE_KEY)?,
    )?;
    Ok(rec.finish())
}

/// Committing the writer explicitly makes the update visible to a separate
/// reader.
pub fn explicit_commit_is_visible(fixture: &FixtureStore) -> Result<ScenarioReport, ScenarioError> {
    fixture.reset();
    let mut rec = Recorder::new(
        "explicit-commit",
        "update followed by an explicit commit is visible to a separate reader",
    );

    let mut writer = fixture.begin();
    fixture.write(&mut writer, FIXTURE_KEY, Record::enabled(true))?;
    fixture.commit(&mut writer)?;

    rec.check(
        "separate reader after commit",
        true,
        fixture.read(None, FIXTURE_KEY)?,
    )?;
    let mut reader = fixture.begin();
    rec.check(
        "new transaction after commit",
        true,
        fixture.read(Some(&reader), FIXTURE_KEY)?,
    )?;
    fixture.rollback(&mut reader)?;
    Ok(rec.finish())
}

/// An update made inside a closure-scoped transaction is committed when the
/// closure returns and is then visible to a separate reader.
pub fn scoped_transaction_is_visible(
    fixture: &FixtureStore,
) -> Result<ScenarioReport, ScenarioError> {
    fixture.reset();
    let mut rec = Recorder::new(
        "scoped-transaction",
        "update inside a scoped transaction is visible once the scope ends",
    );

    fixture.transaction(|txn| txn.put(FIXTURE_KEY, Record::enabled(true)))?;

    rec.check(
        "separate reader after scope",
        true,
        fixture.read(None, FIXTURE_KEY)?,
    )?;
    Ok(rec.finish())
}

/// Two transactions open at once: the second sees the first's update only
/// after the first commits.
pub fn concurrent_handle_sees_commit(
    fixture: &FixtureStore,
) -> Result<ScenarioReport, ScenarioError> {
    fixture.reset();
    let mut rec = Recorder::new(
        "concurrent-handles",
        "a second open transaction sees the first one's update after commit",
    );

    let mut first = fixture.begin();
    let mut second = fixture.begin();
    fixture.write(&mut first, FIXTURE_KEY, Record::enabled(true))?;

    rec.check(
        "second transaction before commit",
        false,
        fixture.read(Some(&second), FIXTURE_KEY)?,
    )?;

    fixture.commit(&mut first)?;
    rec.check(
        "second transaction after commit",
        true,
        fixture.read(Some(&second), FIXTURE_KEY)?,
    )?;

    fixture.rollback(&mut second)?;
    Ok(rec.finish())
}

/// Runs every scenario in [`ALL`] against the same fixture.
pub fn run_all(fixture: &FixtureStore) -> Vec<Result<ScenarioReport, ScenarioError>> {
    ALL.iter().map(|(_, scenario)| scenario(fixture)).collect()
}

/// Looks up a scenario by name.
pub fn find(name: &str) -> Option<Scenario> {
    ALL.iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, scenario)| *scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_passes() {
        let fixture = FixtureStore::new();
        for result in run_all(&fixture) {
            let report = result.unwrap();
            assert!(!report.observations.is_empty(), "{}", report.name);
        }
    }

    #[test]
    fn find_by_name() {
        assert!(find("explicit-commit").is_some());
        assert!(find("no-such-scenario").is_none());
    }

    #[test]
    fn mismatch_is_reported() {
        let mut rec = Recorder::new("demo", "demo");
        let err = rec
            .check("read", true, Some(Record::enabled(false)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "demo: read: expected Some(true), got Some(false)"
        );
        assert!(rec.observations.is_empty());
    }

    #[test]
    fn scenarios_leave_no_open_transactions() {
        let fixture = FixtureStore::new();
        for (_, scenario) in ALL {
            scenario(&fixture).unwrap();
        }
        assert_eq!(fixture.active_count(), 0);
    }
}
