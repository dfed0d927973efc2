//! Check command - Edge consistency diagnostics
//!
//! Builds the graph with edge checking forced on and prints every
//! parent/child disagreement, missing parent and duplicate key.

use anyhow::{Context, Result};
use clap::Args;
use cratetrace_core::GraphDiagnostics;

use super::{facade_from_config, load_config, print_json, resolve_workspace};
use crate::GlobalOptions;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Exit with an error when any inconsistency is found
    #[arg(long)]
    strict: bool,
}

/// Execute the check command
pub async fn execute(args: CheckArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let mut config = load_config(&global, &workspace)?;
    config.graph.check_edges = true;

    let facade = facade_from_config(&config, &workspace)?;
    let graph = facade.supply_chain().await.context("Failed to build graph")?;
    let diagnostics = graph.diagnostics();

    if global.quiet {
        print_json(diagnostics)?;
    } else {
        print_diagnostics(diagnostics, graph.node_count());
    }

    if args.strict && !diagnostics.is_clean() {
        anyhow::bail!("Ledger snapshot has inconsistencies");
    }
    Ok(())
}

fn print_diagnostics(diagnostics: &GraphDiagnostics, node_count: usize) {
    println!("Checked {} crates", node_count);

    if diagnostics.is_clean() {
        println!("No inconsistencies found");
        return;
    }

    if !diagnostics.edge_mismatches.is_empty() {
        println!("\nEdge mismatches ({}):", diagnostics.edge_mismatches.len());
        for mismatch in &diagnostics.edge_mismatches {
            println!("  {}", mismatch);
        }
    }

    if !diagnostics.missing_parents.is_empty() {
        println!("\nMissing parents ({}):", diagnostics.missing_parents.len());
        for (key, parents) in &diagnostics.missing_parents {
            println!("  {} -> {}", key, parents.join(", "));
        }
    }

    if !diagnostics.duplicate_keys.is_empty() {
        println!("\nDuplicate keys ({}):", diagnostics.duplicate_keys.len());
        for key in &diagnostics.duplicate_keys {
            println!("  {}", key);
        }
    }

    if !diagnostics.synthetic_roots.is_empty() {
        println!("\nPromoted roots ({}):", diagnostics.synthetic_roots.len());
        for key in &diagnostics.synthetic_roots {
            println!("  {}", key);
        }
    }

    if !diagnostics.cycle_anchors.is_empty() {
        println!(
            "\nCycles with no path from a root ({}):",
            diagnostics.cycle_anchors.len()
        );
        for key in &diagnostics.cycle_anchors {
            println!("  {}", key);
        }
    }

    if !diagnostics.unresolved_lineages.is_empty() {
        println!(
            "\nUnreachable from any root ({}):",
            diagnostics.unresolved_lineages.len()
        );
        for key in &diagnostics.unresolved_lineages {
            println!("  {}", key);
        }
    }
}
