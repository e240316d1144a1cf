//! Module discovery using the `ignore` crate.
//!
//! Walks a package directory and maps every `.py` file to a dotted module
//! name anchored at the package prefix:
//!
//! ```text
//! root/__init__.py      -> pkg
//! root/a.py             -> pkg.a
//! root/sub/__init__.py  -> pkg.sub
//! root/sub/b.py         -> pkg.sub.b
//! ```
//!
//! By default every file under the root is visited, hidden or ignored alike.
//! Gitignore handling and extra glob excludes are opt-in through
//! [`ScanConfig`].

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument, warn};

use crate::error::{ReconError, Result};

/// Source file extension recognised as a module.
pub const SOURCE_EXTENSION: &str = "py";

/// Stem of the package initializer file.
pub const PACKAGE_INITIALIZER: &str = "__init__";

/// Options controlling the directory walk.
#[derive(Clone, Debug, Serialize)]
pub struct ScanConfig {
    /// Honour `.gitignore`, global git excludes and `.reconignore` files.
    pub respect_ignore_files: bool,

    /// Visit hidden files and directories.
    pub include_hidden: bool,

    /// Follow symbolic links to directories.
    pub follow_symlinks: bool,

    /// Additional glob patterns to exclude, relative to the root.
    pub ignore_patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            respect_ignore_files: false,
            include_hidden: true,
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
        }
    }
}

/// A source file and the dotted module name it denotes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DiscoveredModule {
    /// Dotted module name, e.g. `pkg.sub.b`.
    pub name: String,

    /// Path to the source file (root joined with the relative path).
    pub path: PathBuf,
}

/// Map a path relative to the package root to its dotted module name.
///
/// Returns `None` for files that are not Python sources.
pub fn module_name(relative: &Path, package: &str) -> Option<String> {
    if relative.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
        return None;
    }

    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.last().map(String::as_str) == Some(PACKAGE_INITIALIZER) {
        parts.pop();
    }

    if parts.is_empty() {
        Some(package.to_string())
    } else {
        Some(format!("{}.{}", package, parts.join(".")))
    }
}

/// Discover every module under `root`.
///
/// # Arguments
///
/// * `root` - Package directory to scan
/// * `package` - Dotted name of the package rooted at `root`
/// * `config` - Walk options
///
/// # Errors
///
/// A missing root or any directory that cannot be read aborts the scan;
/// partial results are never returned.
#[instrument(skip(config), fields(root = %root.display()))]
pub fn discover_modules(
    root: &Path,
    package: &str,
    config: &ScanConfig,
) -> Result<Vec<DiscoveredModule>> {
    if !root.is_dir() {
        return Err(ReconError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(config.respect_ignore_files)
        .hidden(!config.include_hidden)
        .follow_links(config.follow_symlinks);
    if config.respect_ignore_files {
        builder.add_custom_ignore_filename(".reconignore");
    }

    if !config.ignore_patterns.is_empty() {
        let mut overrides = OverrideBuilder::new(root);
        for pattern in &config.ignore_patterns {
            // `!` turns the override into an exclusion.
            if let Err(e) = overrides.add(&format!("!{pattern}")) {
                warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }
        builder.overrides(overrides.build()?);
    }

    let mut modules = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let is_file = entry
            .file_type()
            .is_some_and(|ft| ft.is_file() || (ft.is_symlink() && entry.path().is_file()));
        if !is_file {
            continue;
        }

        let path = entry.into_path();
        let relative = path.strip_prefix(root).unwrap_or(&path);
        if let Some(name) = module_name(relative, package) {
            debug!(module = %name, "discovered");
            modules.push(DiscoveredModule { name, path });
        }
    }

    modules.sort();
    debug!("Discovered {} modules", modules.len());
    Ok(modules)
}
