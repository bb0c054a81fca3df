//! Stress command implementation.

use crate::error::CliError;
use std::sync::Arc;
use tracing::info;
use txkv_core::Store;
use txkv_testkit::{stress_concurrent_commits, StressConfig, StressTestResult};

/// Runs the stress command.
pub fn run(threads: usize, operations: usize, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if threads == 0 {
        return Err(CliError::InvalidArgument("threads must be at least 1".into()).into());
    }

    let config = StressConfig {
        operations,
        threads,
    };
    let store = Arc::new(Store::new());
    info!(threads, operations, "starting stress run");
    let result = stress_concurrent_commits(Arc::clone(&store), &config);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result, &store);
        }
    }

    if !result.is_clean() {
        return Err(CliError::StressFailed {
            failed: result.failed_ops,
            torn: result.torn_reads,
        }
        .into());
    }
    Ok(())
}

fn print_text_output(result: &StressTestResult, store: &Store) {
    let stats = store.stats().snapshot();
    println!("txkv Stress Run");
    println!("===============");
    println!();
    println!("Operations:");
    println!("  Total:       {}", result.total_ops);
    println!("  Successful:  {}", result.successful_ops);
    println!("  Failed:      {}", result.failed_ops);
    println!("  Torn reads:  {}", result.torn_reads);
    println!("  Duration:    {:?}", result.duration);
    println!("  Throughput:  {:.2} ops/sec", result.ops_per_second);
    println!();
    println!("Store:");
    println!("  Committed:   {}", stats.transactions_committed);
    println!("  Rolled back: {}", stats.transactions_rolled_back);
    println!("  Last commit: {}", store.committed_seq());
}
