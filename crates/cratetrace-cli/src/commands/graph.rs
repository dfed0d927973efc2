//! Graph command - Supply-chain graph queries

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use cratetrace_backend::{GraphStats, QueryFacade};
use cratetrace_core::GraphNode;

use super::{create_facade, print_json};
use crate::GlobalOptions;

/// Arguments for the graph command
#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(subcommand)]
    command: GraphSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GraphSubcommand {
    /// Show graph statistics
    Stats,

    /// List root crates
    Roots,

    /// Show every crate with its depth
    Show,

    /// Show the lineage of one crate, root first
    Lineage {
        /// Record key
        key: String,
    },

    /// Find crates by key or label
    Find {
        /// Pattern (supports * wildcards)
        pattern: String,

        /// Maximum results
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },
}

/// Execute the graph command
pub async fn execute(args: GraphArgs, global: GlobalOptions) -> Result<()> {
    let facade = create_facade(&global)?;

    match args.command {
        GraphSubcommand::Stats => execute_stats(&facade, &global).await,
        GraphSubcommand::Roots => execute_roots(&facade, &global).await,
        GraphSubcommand::Show => execute_show(&facade, &global).await,
        GraphSubcommand::Lineage { key } => execute_lineage(&facade, &key, &global).await,
        GraphSubcommand::Find { pattern, limit } => {
            execute_find(&facade, &pattern, limit, &global).await
        }
    }
}

async fn execute_stats(facade: &QueryFacade, global: &GlobalOptions) -> Result<()> {
    let stats = facade.stats().await.context("Failed to get stats")?;

    if global.quiet {
        return print_json(&stats);
    }

    print_stats(&stats, facade.source());
    Ok(())
}

fn print_stats(stats: &GraphStats, source: &str) {
    println!("Supply Chain Statistics");
    println!("=======================");
    println!("Source: {}", source);
    println!("Crates: {}", stats.node_count);
    println!(
        "Roots: {} ({} promoted)",
        stats.root_count, stats.synthetic_root_count
    );
    if stats.cycle_anchor_count > 0 {
        println!("Cycle members without a root: {}", stats.cycle_anchor_count);
    }
    println!("Max depth: {}", stats.max_depth);

    println!("\nCrates by operation:");
    for (kind, count) in &stats.operations {
        println!("  {}: {}", kind, count);
    }

    if stats.edge_mismatch_count + stats.missing_parent_count + stats.duplicate_count > 0 {
        println!("\nDiagnostics:");
        println!("  Edge mismatches: {}", stats.edge_mismatch_count);
        println!("  Missing parents: {}", stats.missing_parent_count);
        println!("  Duplicate keys: {}", stats.duplicate_count);
    }
}

async fn execute_roots(facade: &QueryFacade, global: &GlobalOptions) -> Result<()> {
    let graph = facade.supply_chain().await.context("Failed to build graph")?;

    if global.quiet {
        return print_json(graph.roots());
    }

    let synthetic = &graph.diagnostics().synthetic_roots;
    println!("Roots ({}):", graph.roots().len());
    for key in graph.roots() {
        if synthetic.contains(key) {
            println!("  {} (promoted)", key);
        } else {
            println!("  {}", key);
        }
    }
    Ok(())
}

async fn execute_show(facade: &QueryFacade, global: &GlobalOptions) -> Result<()> {
    let graph = facade.supply_chain().await.context("Failed to build graph")?;

    if global.quiet {
        return print_json(&graph);
    }

    if graph.is_empty() {
        println!("No crates in {}", facade.source());
        return Ok(());
    }

    for node in graph.iter_nodes() {
        print_node_line(node);
    }
    Ok(())
}

async fn execute_lineage(facade: &QueryFacade, key: &str, global: &GlobalOptions) -> Result<()> {
    let history = facade
        .crate_history(key)
        .await
        .with_context(|| format!("Failed to trace {}", key))?;

    if global.quiet {
        return print_json(&history.lineage_path);
    }

    println!("{}", history.lineage_path.join(" -> "));
    Ok(())
}

async fn execute_find(
    facade: &QueryFacade,
    pattern: &str,
    limit: usize,
    global: &GlobalOptions,
) -> Result<()> {
    let found = facade
        .find(pattern, limit)
        .await
        .context("Failed to search graph")?;

    if global.quiet {
        return print_json(&found);
    }

    if found.is_empty() {
        println!("No crates match '{}'", pattern);
        return Ok(());
    }

    println!("Found {} crates:", found.len());
    for node in &found {
        print_node_line(node);
    }
    Ok(())
}

fn print_node_line(node: &GraphNode) {
    let root = if node.is_root { " [root]" } else { "" };
    let label = if node.record.label.is_empty() {
        String::new()
    } else {
        format!(" {}", node.record.label)
    };
    println!(
        "  {}{} {} depth={}{}",
        node.key(),
        label,
        node.record.operation_kind,
        node.depth,
        root
    );
}
