//! Scan command - List the modules discovered under a package root

use anyhow::{Context, Result};
use colored::Colorize;
use recon_core::{discover_modules, DiscoveredModule};
use serde::Serialize;

use super::{package_name, resolve_root, GlobalOptions};
use crate::config::ReconConfig;
use crate::output::{Column, Output, OutputConfig, OutputFormat, Outputter, TableOutput};

/// Modules found by discovery.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub root: String,
    pub package: String,
    pub module_count: usize,
    pub modules: Vec<DiscoveredModule>,
}

impl Outputter for ScanReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut out = format!(
            "{} {} ({} modules)\n",
            "Package".bold(),
            self.package.cyan(),
            self.module_count
        );
        let columns = [Column::new("Module", "name"), Column::new("Path", "path")];
        out.push_str(&TableOutput::format_with_columns(&self.modules, &columns, config));
        out
    }
}

/// Run discovery and print the module list.
pub fn run(
    path: &str,
    package: Option<&str>,
    config: &ReconConfig,
    opts: &GlobalOptions,
    format: OutputFormat,
) -> Result<()> {
    let root = resolve_root(path)?;
    let package = package_name(&root, package)?;

    let modules = discover_modules(&root, &package, &config.scan_config())
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    let report = ScanReport {
        root: root.display().to_string(),
        package,
        module_count: modules.len(),
        modules,
    };
    Output::new(report, format).with_compact(opts.compact).write(None)
}
