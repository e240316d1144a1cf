//! recon configuration loading from `.reconrc.toml`.
//!
//! The file is looked up in the analysed root. Configuration is optional:
//! a missing file yields defaults, and command-line flags override whatever
//! the file says.
//!
//! # Example Configuration
//!
//! ```toml
//! [scanner]
//! ignore = ["build/", "*_pb2.py"]
//! respect_ignore_files = true
//!
//! [prune]
//! min_cc = 2
//! loc_percentile = 75
//! degree_percentile = 75
//! noise_patterns = ['(^|\.)tests?($|\.)', '(^|\.)legacy($|\.)']
//!
//! [collapse]
//! depth = 2
//!
//! [output]
//! format = "table"
//! color = true
//! ```

use anyhow::{Context, Result};
use recon_core::{NoisePatterns, ScanConfig};
use serde::Deserialize;
use std::path::Path;

use crate::stats::{Threshold, ThresholdSpec};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = ".reconrc.toml";

/// Root configuration structure loaded from `.reconrc.toml`.
///
/// All sections are optional and will use defaults if not specified.
#[derive(Debug, Deserialize, Default)]
pub struct ReconConfig {
    /// File discovery options.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Pruning thresholds and noise patterns.
    #[serde(default)]
    pub prune: PruneConfig,

    /// Package aggregation.
    #[serde(default)]
    pub collapse: CollapseConfig,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Scanner configuration controlling file discovery.
#[derive(Debug, Deserialize, Default)]
pub struct ScannerConfig {
    /// Additional glob patterns to ignore during scanning.
    ///
    /// # Example
    /// ```toml
    /// ignore = ["build/", "*_pb2.py"]
    /// ```
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Honour `.gitignore` and `.reconignore` files. Default: `false`.
    #[serde(default)]
    pub respect_ignore_files: Option<bool>,

    /// Visit hidden files and directories. Default: `true`.
    #[serde(default)]
    pub include_hidden: Option<bool>,

    /// Follow symbolic links. Default: `false`.
    #[serde(default)]
    pub follow_symlinks: Option<bool>,
}

/// Pruning configuration.
///
/// Each metric takes either an absolute minimum (`min_*`) or a percentile of
/// the corpus's own distribution (`*_percentile`, 0 to 100). When both are
/// given the absolute value wins.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PruneConfig {
    pub min_loc: Option<u64>,
    pub min_cc: Option<u64>,
    pub min_degree: Option<u64>,
    pub min_pagerank: Option<f64>,

    pub loc_percentile: Option<f64>,
    pub cc_percentile: Option<f64>,
    pub degree_percentile: Option<f64>,
    pub pagerank_percentile: Option<f64>,

    /// Replaces the built-in noise pattern list.
    pub noise_patterns: Option<Vec<String>>,
}

/// Package aggregation configuration.
#[derive(Debug, Deserialize, Default)]
pub struct CollapseConfig {
    /// Number of leading name segments that identify a package.
    pub depth: Option<usize>,
}

/// Output formatting preferences.
///
/// Command-line flags (e.g., `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table`, `json` or `dot`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output.
    ///
    /// Defaults to auto-detection.
    #[serde(default)]
    pub color: Option<bool>,
}

fn pick<T>(absolute: Option<T>, percentile: Option<f64>) -> Option<Threshold<T>> {
    absolute
        .map(Threshold::Absolute)
        .or(percentile.map(Threshold::Percentile))
}

impl PruneConfig {
    /// Threshold choices expressed by this section.
    pub fn threshold_spec(&self) -> ThresholdSpec {
        ThresholdSpec {
            loc: pick(self.min_loc, self.loc_percentile),
            cc: pick(self.min_cc, self.cc_percentile),
            degree: pick(self.min_degree, self.degree_percentile),
            pagerank: pick(self.min_pagerank, self.pagerank_percentile),
        }
    }

    /// Layer `other` on top of this section: any value it sets for a metric
    /// replaces both forms of that metric here.
    pub fn overlay(&self, other: &PruneConfig) -> PruneConfig {
        fn layer<T: Copy>(
            base: (Option<T>, Option<f64>),
            top: (Option<T>, Option<f64>),
        ) -> (Option<T>, Option<f64>) {
            if top.0.is_some() || top.1.is_some() {
                top
            } else {
                base
            }
        }

        let (min_loc, loc_percentile) = layer(
            (self.min_loc, self.loc_percentile),
            (other.min_loc, other.loc_percentile),
        );
        let (min_cc, cc_percentile) = layer(
            (self.min_cc, self.cc_percentile),
            (other.min_cc, other.cc_percentile),
        );
        let (min_degree, degree_percentile) = layer(
            (self.min_degree, self.degree_percentile),
            (other.min_degree, other.degree_percentile),
        );
        let (min_pagerank, pagerank_percentile) = layer(
            (self.min_pagerank, self.pagerank_percentile),
            (other.min_pagerank, other.pagerank_percentile),
        );

        PruneConfig {
            min_loc,
            min_cc,
            min_degree,
            min_pagerank,
            loc_percentile,
            cc_percentile,
            degree_percentile,
            pagerank_percentile,
            noise_patterns: other
                .noise_patterns
                .clone()
                .or_else(|| self.noise_patterns.clone()),
        }
    }

    /// Compile the configured noise patterns, or the built-in list.
    pub fn noise_patterns(&self) -> Result<NoisePatterns> {
        match &self.noise_patterns {
            Some(patterns) => NoisePatterns::new(patterns).context("Invalid [prune].noise_patterns"),
            None => Ok(NoisePatterns::default()),
        }
    }
}

impl ReconConfig {
    /// Load configuration from `.reconrc.toml` in the given directory.
    ///
    /// If the config file doesn't exist or can't be parsed, returns defaults.
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        match Self::load_strict(root) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration, failing on unreadable or malformed files.
    ///
    /// A missing file is not an error.
    pub fn load_strict(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Load honouring `--strict`.
    pub fn load_with(root: &Path, strict: bool) -> Result<Self> {
        if strict {
            Self::load_strict(root)
        } else {
            Ok(Self::load(root))
        }
    }

    /// Scanner options with configured values applied over the defaults.
    pub fn scan_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            respect_ignore_files: self
                .scanner
                .respect_ignore_files
                .unwrap_or(defaults.respect_ignore_files),
            include_hidden: self
                .scanner
                .include_hidden
                .unwrap_or(defaults.include_hidden),
            follow_symlinks: self
                .scanner
                .follow_symlinks
                .unwrap_or(defaults.follow_symlinks),
            ignore_patterns: self.scanner.ignore.clone(),
        }
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Check if colored output should be used.
    ///
    /// Returns the configured value, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ReconConfig::default();
        assert!(config.scanner.ignore.is_empty());
        assert!(config.prune.min_loc.is_none());
        assert!(config.collapse.depth.is_none());
        assert!(config.output.format.is_none());

        let scan = config.scan_config();
        assert!(!scan.respect_ignore_files);
        assert!(scan.include_hidden);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[scanner]
ignore = ["build/", "*_pb2.py"]
respect_ignore_files = true
include_hidden = false

[prune]
min_cc = 2
loc_percentile = 75
min_pagerank = 0.01
noise_patterns = ['(^|\.)legacy($|\.)']

[collapse]
depth = 3

[output]
format = "json"
color = false
"#;
        let config: ReconConfig = toml::from_str(toml_content).unwrap();

        let scan = config.scan_config();
        assert_eq!(scan.ignore_patterns, vec!["build/", "*_pb2.py"]);
        assert!(scan.respect_ignore_files);
        assert!(!scan.include_hidden);
        assert!(!scan.follow_symlinks);

        let spec = config.prune.threshold_spec();
        assert_eq!(spec.cc, Some(Threshold::Absolute(2)));
        assert_eq!(spec.loc, Some(Threshold::Percentile(75.0)));
        assert_eq!(spec.degree, None);
        assert_eq!(spec.pagerank, Some(Threshold::Absolute(0.01)));

        let noise = config.prune.noise_patterns().unwrap();
        assert!(noise.is_noise("pkg.legacy.api"));
        assert!(!noise.is_noise("pkg.tests"));

        assert_eq!(config.collapse.depth, Some(3));
        assert_eq!(config.default_format(), Some("json"));
        assert_eq!(config.use_color(), Some(false));
    }

    #[test]
    fn test_absolute_wins_over_percentile() {
        let prune = PruneConfig {
            min_loc: Some(40),
            loc_percentile: Some(90.0),
            ..PruneConfig::default()
        };
        assert_eq!(prune.threshold_spec().loc, Some(Threshold::Absolute(40)));
    }

    #[test]
    fn test_overlay_replaces_whole_metric() {
        let file = PruneConfig {
            min_loc: Some(40),
            min_cc: Some(3),
            noise_patterns: Some(vec!["x".into()]),
            ..PruneConfig::default()
        };
        let flags = PruneConfig {
            loc_percentile: Some(50.0),
            ..PruneConfig::default()
        };
        let merged = file.overlay(&flags);
        assert_eq!(merged.threshold_spec().loc, Some(Threshold::Percentile(50.0)));
        assert_eq!(merged.threshold_spec().cc, Some(Threshold::Absolute(3)));
        assert_eq!(merged.noise_patterns, Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_invalid_noise_pattern() {
        let prune = PruneConfig {
            noise_patterns: Some(vec!["(".into()]),
            ..PruneConfig::default()
        };
        assert!(prune.noise_patterns().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ReconConfig::load_with(dir.path(), true).unwrap();
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_malformed_file_strict_and_lenient() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[prune\nmin_loc = ").unwrap();

        let lenient = ReconConfig::load(dir.path());
        assert!(lenient.prune.min_loc.is_none());

        let err = ReconConfig::load_with(dir.path(), true).unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE));
    }
}
