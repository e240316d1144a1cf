//! Command implementations for the recon CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod graph;
pub mod scan;
pub mod stats;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use recon_core::{build_import_graph, compute_metrics, MetricMaps, ModuleGraph, PageRankConfig};
use std::path::{Path, PathBuf};

use crate::config::ReconConfig;

/// Options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub compact: bool,
}

/// Canonical package root, or an error naming the missing path.
pub fn resolve_root(path: &str) -> Result<PathBuf> {
    let root = Path::new(path);
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }
    root.canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))
}

/// The explicit package prefix, or the root directory's own name.
pub fn package_name(root: &Path, package: Option<&str>) -> Result<String> {
    match package {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        Some(_) => bail!("Package prefix must not be empty"),
        None => root
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .context("Cannot derive a package name from the root; pass --package"),
    }
}

/// Print a stage summary line to stderr.
pub fn report_stage(opts: &GlobalOptions, message: String) {
    if !opts.quiet {
        eprintln!("{} {}", "•".dimmed(), message);
    }
}

/// A built and annotated module graph with its metric distributions.
pub struct Analysis {
    pub package: String,
    pub graph: ModuleGraph,
    pub maps: MetricMaps,
}

/// Build the import graph and compute its metrics.
pub fn analyze(
    path: &str,
    package: Option<&str>,
    config: &ReconConfig,
    opts: &GlobalOptions,
) -> Result<Analysis> {
    let root = resolve_root(path)?;
    let package = package_name(&root, package)?;

    let mut graph = build_import_graph(&root, &package, &config.scan_config())
        .with_context(|| format!("Failed to build import graph for {}", root.display()))?;
    report_stage(
        opts,
        format!(
            "Extracted {} modules and {} edges.",
            graph.node_count(),
            graph.edge_count()
        ),
    );

    let maps = compute_metrics(&mut graph, &PageRankConfig::default())
        .context("Failed to compute module metrics")?;

    Ok(Analysis {
        package,
        graph,
        maps,
    })
}
