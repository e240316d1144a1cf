//! Module metrics: size, complexity, degree and centrality.
//!
//! Each metric is computed into its own name-keyed map so callers can derive
//! statistics (percentile thresholds, for instance) before the values are
//! written onto the graph with [`annotate_metrics`].

pub mod complexity;
pub mod pagerank;

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::graph::{DepGraph, ModuleGraph};
use crate::parser::{self, python};

pub use pagerank::{PageRankConfig, PageRankResult};

/// Per-module metric maps, keyed by module name.
#[derive(Debug, Clone, Default)]
pub struct MetricMaps {
    pub loc: HashMap<String, u64>,
    pub cc: HashMap<String, u64>,
    pub degree: HashMap<String, u64>,
    pub pagerank: HashMap<String, f64>,
}

impl MetricMaps {
    /// Compute all four metrics for `graph`.
    pub fn compute(graph: &ModuleGraph, config: &PageRankConfig) -> Result<Self> {
        Ok(Self {
            loc: compute_module_loc(graph)?,
            cc: compute_module_cc(graph)?,
            degree: compute_degree(graph),
            pagerank: compute_pagerank(graph, config),
        })
    }
}

/// Count lines that contain anything besides whitespace.
pub fn count_non_blank_lines(source: &str) -> u64 {
    source.lines().filter(|line| !line.trim().is_empty()).count() as u64
}

/// Summed block complexity of one source file.
pub fn file_complexity(source: &str, path: &Path) -> Result<u64> {
    let tree = python::parse(source, path)?;
    Ok(u64::from(complexity::total_complexity(&tree, source)))
}

/// Non-blank line count per module, read from each node's source file.
#[instrument(skip_all)]
pub fn compute_module_loc(graph: &ModuleGraph) -> Result<HashMap<String, u64>> {
    per_module(graph, |_, source| Ok(count_non_blank_lines(source)))
}

/// Cyclomatic complexity per module.
#[instrument(skip_all)]
pub fn compute_module_cc(graph: &ModuleGraph) -> Result<HashMap<String, u64>> {
    per_module(graph, |path, source| file_complexity(source, path))
}

/// Read every module's source in parallel and apply `metric` to it.
fn per_module<F>(graph: &ModuleGraph, metric: F) -> Result<HashMap<String, u64>>
where
    F: Fn(&Path, &str) -> Result<u64> + Sync,
{
    let nodes: Vec<_> = graph.nodes().collect();
    nodes
        .par_iter()
        .map(|(name, node)| {
            let source = parser::read_source(&node.path)?;
            let value = metric(&node.path, &source)?;
            Ok(((*name).to_string(), value))
        })
        .collect()
}

/// Total (in + out) degree per node.
pub fn compute_degree<N, E>(graph: &DepGraph<N, E>) -> HashMap<String, u64> {
    graph
        .nodes()
        .map(|(name, _)| (name.to_string(), graph.degree(name) as u64))
        .collect()
}

/// PageRank per node on the undirected projection.
pub fn compute_pagerank<N, E>(graph: &DepGraph<N, E>, config: &PageRankConfig) -> HashMap<String, f64> {
    pagerank::pagerank(graph, config).scores
}

/// Write the metric maps onto the graph's nodes.
///
/// Nodes absent from a map get 0 (or 0.0); entries for unknown names are
/// ignored.
pub fn annotate_metrics(graph: &mut ModuleGraph, maps: &MetricMaps) {
    for (name, node) in graph.nodes_mut() {
        node.metrics.loc = maps.loc.get(name).copied().unwrap_or(0);
        node.metrics.cc = maps.cc.get(name).copied().unwrap_or(0);
        node.metrics.degree = maps.degree.get(name).copied().unwrap_or(0);
        node.metrics.pagerank = maps.pagerank.get(name).copied().unwrap_or(0.0);
    }
}

/// Compute and annotate all metrics in one step.
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn compute_metrics(graph: &mut ModuleGraph, config: &PageRankConfig) -> Result<MetricMaps> {
    let maps = MetricMaps::compute(graph, config)?;
    annotate_metrics(graph, &maps);
    debug!("Annotated {} modules", graph.node_count());
    Ok(maps)
}
