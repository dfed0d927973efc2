//! History command - Trace one crate back to its origin

use anyhow::{Context, Result};
use clap::Args;

use super::{create_facade, print_json};
use crate::GlobalOptions;

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Record key of the crate to trace
    key: String,
}

/// Execute the history command
pub async fn execute(args: HistoryArgs, global: GlobalOptions) -> Result<()> {
    let facade = create_facade(&global)?;
    let history = facade
        .crate_history(&args.key)
        .await
        .with_context(|| format!("Failed to get history of {}", args.key))?;

    if global.quiet {
        return print_json(&history);
    }

    println!("History of {}", history.key);
    println!("  Root: {}", history.root.key());
    println!("  Depth: {}", history.depth);
    if history.is_root {
        println!("  (crate is itself a root)");
    }

    println!();
    for (step, node) in history.ordered_history.iter().enumerate() {
        let record = &node.record;
        println!("{:>3}. {} [{}]", step, node.key(), record.operation_kind);
        if !record.label.is_empty() {
            println!("     label: {}", record.label);
        }
        if !record.custodian.is_empty() {
            println!("     custodian: {}", record.custodian);
        }
        println!("     weight: {}", record.weight);
        if record.created_at != 0 {
            println!("     created_at: {}", record.created_at);
        }
    }

    Ok(())
}
