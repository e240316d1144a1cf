//! Stats command - Metric distributions for choosing pruning thresholds

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::{analyze, GlobalOptions};
use crate::config::ReconConfig;
use crate::output::{Alignment, Column, Output, OutputConfig, OutputFormat, Outputter, TableOutput};
use crate::stats::{summarize, MetricSummary};

/// Percentile summary of every metric over the module graph.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub package: String,
    pub modules: usize,
    pub edges: usize,
    pub metrics: Vec<MetricSummary>,
}

impl Outputter for StatsReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut out = format!(
            "{} {} ({} modules, {} edges)\n",
            "Metrics for".bold(),
            self.package.cyan(),
            self.modules,
            self.edges
        );
        let mut columns = vec![Column::new("Metric", "metric")];
        for key in ["min", "p25", "p50", "p75", "p85", "p90", "max"] {
            columns.push(Column::new(key, key).with_alignment(Alignment::Right));
        }
        out.push_str(&TableOutput::format_with_columns(&self.metrics, &columns, config));
        out
    }
}

/// Build the graph and print percentiles of each metric.
pub fn run(
    path: &str,
    package: Option<&str>,
    config: &ReconConfig,
    opts: &GlobalOptions,
    format: OutputFormat,
) -> Result<()> {
    let analysis = analyze(path, package, config, opts)?;
    let report = StatsReport {
        package: analysis.package,
        modules: analysis.graph.node_count(),
        edges: analysis.graph.edge_count(),
        metrics: summarize(&analysis.maps),
    };
    Output::new(report, format).with_compact(opts.compact).write(None)
}
