//! Recon Core - Architecture recovery for Python source trees.
//!
//! Builds a module-level import graph from a package on disk, annotates it
//! with size, complexity and centrality metrics, prunes the noise and
//! aggregates what is left into a package-level view.
//!
//! # Pipeline
//!
//! ```text
//! scanner ─▶ parser ─▶ resolver ─▶ builder ─▶ metrics ─▶ prune ─▶ collapse
//!  files     imports    dotted     ModuleGraph  loc/cc/    filter   PackageGraph
//!                       names                   degree/pr
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use recon_core::{
//!     build_import_graph, collapse_to_packages, compute_metrics, prune_graph,
//!     NoisePatterns, PageRankConfig, PruneThresholds, ScanConfig,
//! };
//! use std::path::Path;
//!
//! let mut graph = build_import_graph(Path::new("src/zeeguu"), "zeeguu", &ScanConfig::default())?;
//! compute_metrics(&mut graph, &PageRankConfig::default())?;
//! let pruned = prune_graph(&graph, "zeeguu", &PruneThresholds::default(), &NoisePatterns::default());
//! let packages = collapse_to_packages(&pruned, 2);
//! # Ok::<(), recon_core::ReconError>(())
//! ```

pub mod builder;
pub mod collapse;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod parser;
pub mod prune;
pub mod resolver;
pub mod scanner;

pub use builder::build_import_graph;
pub use collapse::{collapse_to_packages, package_of};
pub use error::{ReconError, Result};
pub use graph::{DepGraph, Metrics, ModuleGraph, ModuleNode, PackageEdge, PackageGraph};
pub use metrics::{compute_metrics, MetricMaps, PageRankConfig};
pub use prune::{prune_graph, NoisePatterns, PruneThresholds};
pub use scanner::{discover_modules, DiscoveredModule, ScanConfig};
