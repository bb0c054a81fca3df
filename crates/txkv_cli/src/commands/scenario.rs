//! Scenario command implementation.

use crate::error::CliError;
use serde::Serialize;
use tracing::{info, warn};
use txkv_core::{ReadPolicy, StoreConfig};
use txkv_testkit::scenarios::{self, Scenario, ScenarioReport};
use txkv_testkit::FixtureStore;

/// Outcome of one scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// Whether every expectation held.
    pub passed: bool,
    /// Report for a passing scenario.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ScenarioReport>,
    /// Error for a failing scenario.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the scenario command.
pub fn run(
    name: Option<&str>,
    snapshot: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let selected = select(name)?;
    let policy = if snapshot {
        ReadPolicy::Snapshot
    } else {
        ReadPolicy::LatestCommitted
    };
    let fixture = FixtureStore::with_config(StoreConfig::new().read_policy(policy));
    info!(count = selected.len(), ?policy, "running scenarios");

    let outcomes: Vec<ScenarioOutcome> = selected
        .into_iter()
        .map(|(name, scenario)| match scenario(&fixture) {
            Ok(report) => ScenarioOutcome {
                name: name.to_owned(),
                passed: true,
                report: Some(report),
                error: None,
            },
            Err(err) => {
                warn!(scenario = name, error = %err, "scenario failed");
                ScenarioOutcome {
                    name: name.to_owned(),
                    passed: false,
                    report: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
        _ => {
            print_text_output(&outcomes);
        }
    }

    let failed = outcomes.iter().filter(|o| !o.passed).count();
    if failed > 0 {
        return Err(CliError::ScenariosFailed {
            failed,
            total: outcomes.len(),
        }
        .into());
    }
    Ok(())
}

fn select(name: Option<&str>) -> Result<Vec<(&'static str, Scenario)>, CliError> {
    let Some(name) = name else {
        return Ok(scenarios::ALL.to_vec());
    };
    scenarios::ALL
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|entry| vec![*entry])
        .ok_or_else(|| CliError::UnknownScenario {
            name: name.to_owned(),
            available: scenarios::ALL
                .iter()
                .map(|(n, _)| *n)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

fn print_text_output(outcomes: &[ScenarioOutcome]) {
    println!("txkv Visibility Scenarios");
    println!("=========================");
    for outcome in outcomes {
        println!();
        let status = if outcome.passed { "PASS" } else { "FAIL" };
        println!("[{status}] {}", outcome.name);
        if let Some(report) = &outcome.report {
            println!("  {}", report.description);
            for obs in &report.observations {
                let value = obs
                    .enabled
                    .map_or_else(|| "absent".to_owned(), |e| e.to_string());
                println!("  - {:<36} enabled = {value}", obs.step);
            }
        }
        if let Some(error) = &outcome.error {
            println!("  {error}");
        }
    }
}
