//! Graph command - Run the full recovery pipeline
//!
//! Builds the module import graph, annotates metrics, prunes noise and
//! (at package level) collapses modules into packages:
//!
//! - `recon graph <root>` - package view at depth 2
//! - `recon graph <root> --level module` - pruned module view
//! - `recon graph <root> --format dot -o arch.dot` - Graphviz source

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use recon_core::graph::{DepGraph, EdgeWeight, NodeMetrics};
use recon_core::{collapse_to_packages, prune_graph, NoisePatterns};
use serde::Serialize;
use std::path::PathBuf;

use super::{analyze, report_stage, GlobalOptions};
use crate::config::{PruneConfig, ReconConfig};
use crate::output::{Alignment, Column, Output, OutputConfig, OutputFormat, Outputter, TableOutput};
use crate::render::{render_dot, DotOptions};
use crate::stats::resolve_thresholds;

/// Default number of name segments that identify a package.
pub const DEFAULT_DEPTH: usize = 2;

/// Granularity of the emitted graph.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Pruned module graph
    Module,
    /// Modules collapsed into packages (default)
    #[default]
    Package,
}

/// Parse and validate a percentile (must be between 0 and 100)
fn parse_percentile(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("percentile must be between 0 and 100, got {}", value));
    }
    Ok(value)
}

/// Pruning thresholds given on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct ThresholdArgs {
    /// Minimum non-blank lines of code
    #[arg(long, conflicts_with = "loc_percentile")]
    pub min_loc: Option<u64>,

    /// Minimum cyclomatic complexity
    #[arg(long, conflicts_with = "cc_percentile")]
    pub min_cc: Option<u64>,

    /// Minimum total degree
    #[arg(long, conflicts_with = "degree_percentile")]
    pub min_degree: Option<u64>,

    /// Minimum PageRank score
    #[arg(long, conflicts_with = "pagerank_percentile")]
    pub min_pagerank: Option<f64>,

    /// LOC threshold as a percentile of the corpus (0-100)
    #[arg(long, value_parser = parse_percentile)]
    pub loc_percentile: Option<f64>,

    /// CC threshold as a percentile of the corpus (0-100)
    #[arg(long, value_parser = parse_percentile)]
    pub cc_percentile: Option<f64>,

    /// Degree threshold as a percentile of the corpus (0-100)
    #[arg(long, value_parser = parse_percentile)]
    pub degree_percentile: Option<f64>,

    /// PageRank threshold as a percentile of the corpus (0-100)
    #[arg(long, value_parser = parse_percentile)]
    pub pagerank_percentile: Option<f64>,
}

impl From<&ThresholdArgs> for PruneConfig {
    fn from(args: &ThresholdArgs) -> Self {
        PruneConfig {
            min_loc: args.min_loc,
            min_cc: args.min_cc,
            min_degree: args.min_degree,
            min_pagerank: args.min_pagerank,
            loc_percentile: args.loc_percentile,
            cc_percentile: args.cc_percentile,
            degree_percentile: args.degree_percentile,
            pagerank_percentile: args.pagerank_percentile,
            noise_patterns: None,
        }
    }
}

/// Arguments of `recon graph`.
#[derive(Debug, Clone, Args)]
pub struct GraphArgs {
    /// Package root directory
    #[arg(default_value = ".")]
    pub path: String,

    /// Dotted prefix of the package (defaults to the root directory name)
    #[arg(short, long)]
    pub package: Option<String>,

    /// Keep only modules under this namespace (defaults to the package)
    #[arg(long)]
    pub namespace: Option<String>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Keep test, script and other noise modules
    #[arg(long)]
    pub keep_noise: bool,

    /// Output granularity
    #[arg(short, long, value_enum, default_value_t = Level::Package)]
    pub level: Level,

    /// Package depth for collapsing (overrides [collapse].depth)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub depth: Option<u64>,

    /// Graphviz layout engine written into DOT output
    #[arg(long, default_value = "neato")]
    pub layout: String,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// A node of the emitted graph.
#[derive(Debug, Clone, Serialize)]
pub struct NodeRow {
    pub name: String,
    pub loc: u64,
    pub cc: u64,
    pub degree: u64,
    pub pagerank: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// An edge of the emitted graph.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeRow {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Graph result in every output format.
#[derive(Debug, Serialize)]
pub struct GraphReport {
    pub level: Level,
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<EdgeRow>,
    #[serde(skip)]
    dot: String,
}

impl GraphReport {
    /// Snapshot a graph; DOT is rendered only when `dot` is given.
    pub fn new<N, E>(level: Level, graph: &DepGraph<N, E>, dot: Option<&DotOptions>) -> Self
    where
        N: NodeMetrics,
        E: EdgeWeight,
    {
        let nodes = graph
            .nodes()
            .map(|(name, node)| {
                let m = node.metrics();
                NodeRow {
                    name: name.to_string(),
                    loc: m.loc,
                    cc: m.cc,
                    degree: m.degree,
                    pagerank: m.pagerank,
                    path: node.source_path().map(|p| p.display().to_string()),
                }
            })
            .collect();
        let edges = graph
            .edges()
            .map(|(source, target, edge)| EdgeRow {
                source: source.to_string(),
                target: target.to_string(),
                weight: edge.weight(),
            })
            .collect();

        Self {
            level,
            nodes,
            edges,
            dot: dot.map(|options| render_dot(graph, options)).unwrap_or_default(),
        }
    }
}

impl Outputter for GraphReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let kind = match self.level {
            Level::Module => "modules",
            Level::Package => "packages",
        };
        let mut out = format!(
            "{} {} {}, {} edges\n",
            "Graph:".bold(),
            self.nodes.len(),
            kind,
            self.edges.len()
        );

        let node_columns = [
            Column::new("Name", "name"),
            Column::new("LOC", "loc").with_alignment(Alignment::Right),
            Column::new("CC", "cc").with_alignment(Alignment::Right),
            Column::new("Degree", "degree").with_alignment(Alignment::Right),
            Column::new("PageRank", "pagerank").with_alignment(Alignment::Right),
        ];
        out.push_str(&TableOutput::format_with_columns(&self.nodes, &node_columns, config));

        if !self.edges.is_empty() {
            out.push('\n');
            let edge_columns = [
                Column::new("Source", "source"),
                Column::new("Target", "target"),
                Column::new("Weight", "weight").with_alignment(Alignment::Right),
            ];
            out.push_str(&TableOutput::format_with_columns(&self.edges, &edge_columns, config));
        }
        out
    }

    fn to_dot(&self, _config: &OutputConfig) -> String {
        self.dot.clone()
    }
}

/// Run the pipeline and emit the resulting graph.
pub fn run(
    args: &GraphArgs,
    config: &ReconConfig,
    opts: &GlobalOptions,
    format: OutputFormat,
) -> Result<()> {
    let analysis = analyze(&args.path, args.package.as_deref(), config, opts)?;

    let prune = config.prune.overlay(&PruneConfig::from(&args.thresholds));
    let thresholds = resolve_thresholds(&prune.threshold_spec(), &analysis.maps);
    let noise = if args.keep_noise {
        NoisePatterns::none()
    } else {
        prune.noise_patterns()?
    };
    tracing::debug!(?thresholds, noise_patterns = noise.len(), "Pruning");

    let namespace = args.namespace.as_deref().unwrap_or(&analysis.package);
    let pruned = prune_graph(&analysis.graph, namespace, &thresholds, &noise);
    report_stage(
        opts,
        format!(
            "Pruned to {} nodes and {} edges.",
            pruned.node_count(),
            pruned.edge_count()
        ),
    );

    let dot_options = DotOptions {
        layout: args.layout.clone(),
        ..DotOptions::default()
    };
    let dot = (format == OutputFormat::Dot).then_some(&dot_options);

    let report = match args.level {
        Level::Module => GraphReport::new(Level::Module, &pruned, dot),
        Level::Package => {
            let depth = args
                .depth
                .map(|d| d as usize)
                .or(config.collapse.depth)
                .unwrap_or(DEFAULT_DEPTH)
                .max(1);
            let packages = collapse_to_packages(&pruned, depth);
            report_stage(opts, format!("Collapsed to {} packages.", packages.node_count()));
            GraphReport::new(Level::Package, &packages, dot)
        }
    };

    Output::new(report, format)
        .with_compact(opts.compact)
        .write(args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_core::graph::{Metrics, ModuleGraph, ModuleNode, PackageEdge, PackageGraph};

    #[test]
    fn test_parse_percentile() {
        assert_eq!(parse_percentile("75"), Ok(75.0));
        assert_eq!(parse_percentile("0"), Ok(0.0));
        assert!(parse_percentile("101").is_err());
        assert!(parse_percentile("-1").is_err());
        assert!(parse_percentile("high").is_err());
    }

    #[test]
    fn test_report_from_module_graph_keeps_paths() {
        let mut graph = ModuleGraph::new();
        graph.add_node("pkg.a", ModuleNode::new("a.py"));
        graph.add_node("pkg.b", ModuleNode::new("b.py"));
        graph.add_edge("pkg.a", "pkg.b", ());

        let report = GraphReport::new(Level::Module, &graph, None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["level"], "module");
        assert_eq!(json["nodes"][0]["name"], "pkg.a");
        assert_eq!(json["nodes"][0]["path"], "a.py");
        assert_eq!(json["edges"][0]["weight"], 1);
        assert!(json.get("dot").is_none());
    }

    #[test]
    fn test_report_from_package_graph() {
        let mut graph = PackageGraph::new();
        graph.add_edge("pkg.x", "pkg.y", PackageEdge { weight: 4 });
        if let Some(m) = graph.node_mut("pkg.x") {
            *m = Metrics {
                loc: 20,
                cc: 2,
                degree: 4,
                pagerank: 0.5,
            };
        }

        let report = GraphReport::new(Level::Package, &graph, Some(&DotOptions::default()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["nodes"][0]["loc"], 20);
        assert!(json["nodes"][0].get("path").is_none());
        assert_eq!(json["edges"][0]["weight"], 4);

        let dot = report.render(&OutputConfig::new(OutputFormat::Dot));
        assert!(dot.starts_with("digraph architecture {"));
        assert!(dot.contains("label=\"4\""));

        let table = report.render(&OutputConfig::new(OutputFormat::Table));
        assert!(table.contains("2 packages, 1 edges"));
        assert!(table.contains("pkg.x"));
    }

    #[test]
    fn test_threshold_args_become_prune_config() {
        let args = ThresholdArgs {
            min_cc: Some(3),
            loc_percentile: Some(75.0),
            ..ThresholdArgs::default()
        };
        let prune = PruneConfig::from(&args);
        assert_eq!(prune.min_cc, Some(3));
        assert_eq!(prune.loc_percentile, Some(75.0));
        assert!(prune.noise_patterns.is_none());
    }
}
