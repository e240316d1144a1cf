//! Module import graph construction.
//!
//! Discovery, parsing and resolution composed into a [`ModuleGraph`]: one
//! node per discovered module, one edge per (importer, imported) pair.
//!
//! Files are parsed in parallel with rayon and merged into the graph
//! afterwards by a single writer, so the result does not depend on
//! scheduling.

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::graph::{ModuleGraph, ModuleNode};
use crate::parser;
use crate::resolver::extract_package_imports;
use crate::scanner::{discover_modules, DiscoveredModule, ScanConfig};

/// Build the import graph for the package rooted at `root`.
///
/// # Errors
///
/// Discovery failures, unreadable files and syntax errors abort the build.
/// No partial graph is returned.
#[instrument(skip(config), fields(root = %root.display()))]
pub fn build_import_graph(root: &Path, package: &str, config: &ScanConfig) -> Result<ModuleGraph> {
    let modules = discover_modules(root, package, config)?;
    let graph = build_from_modules(&modules, package)?;
    info!(
        "Extracted {} modules and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Build the import graph for an already discovered module set.
pub fn build_from_modules(modules: &[DiscoveredModule], package: &str) -> Result<ModuleGraph> {
    let dependencies: Vec<BTreeSet<String>> = modules
        .par_iter()
        .map(|module| {
            let imports = parser::parse_file_imports(&module.path)?;
            Ok(extract_package_imports(&module.name, &imports, package))
        })
        .collect::<Result<_>>()?;

    let mut graph = ModuleGraph::new();
    for module in modules {
        graph.add_node(module.name.as_str(), ModuleNode::new(&module.path));
    }

    for (module, deps) in modules.iter().zip(dependencies) {
        for dep in deps {
            if !graph.contains_node(&dep) {
                debug!(importer = %module.name, target = %dep, "target is not a discovered module");
                continue;
            }
            graph.add_edge(&module.name, &dep, ());
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconError;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn scenario_a(a_source: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "__init__.py", "");
        write(dir.path(), "a.py", a_source);
        write(dir.path(), "sub/__init__.py", "");
        write(dir.path(), "sub/b.py", "VALUE = 1\n");
        dir
    }

    fn edges(graph: &ModuleGraph) -> Vec<(String, String)> {
        graph
            .edges()
            .map(|(f, t, _)| (f.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_direct_import_of_submodule() {
        let dir = scenario_a("import pkg.sub.b\n");
        let graph = build_import_graph(dir.path(), "pkg", &ScanConfig::default()).unwrap();

        let names: Vec<_> = graph.nodes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["pkg", "pkg.a", "pkg.sub", "pkg.sub.b"]);
        assert_eq!(edges(&graph), vec![("pkg.a".into(), "pkg.sub.b".into())]);
    }

    #[test]
    fn test_relative_from_import_targets_the_package() {
        // `from .sub import b` names pkg.sub, never pkg.sub.b.
        let dir = scenario_a("from .sub import b\n");
        let graph = build_import_graph(dir.path(), "pkg", &ScanConfig::default()).unwrap();

        assert_eq!(edges(&graph), vec![("pkg.a".into(), "pkg.sub".into())]);
        assert!(!graph.contains_edge("pkg.a", "pkg.sub.b"));
    }

    #[test]
    fn test_node_count_matches_discovered_files() {
        let dir = scenario_a("import os\nimport pkg.missing\nfrom pkg.ghost import x\n");
        let graph = build_import_graph(dir.path(), "pkg", &ScanConfig::default()).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.contains_node("pkg.sub.b"));
    }

    #[test]
    fn test_repeated_imports_yield_one_edge() {
        let dir = scenario_a(
            "import pkg.sub.b\nimport pkg.sub.b\nfrom pkg.sub import b\nfrom .sub import b\n",
        );
        let graph = build_import_graph(dir.path(), "pkg", &ScanConfig::default()).unwrap();

        assert_eq!(graph.out_degree("pkg.a"), 2);
        assert!(graph.contains_edge("pkg.a", "pkg.sub.b"));
        assert!(graph.contains_edge("pkg.a", "pkg.sub"));
    }

    #[test]
    fn test_nodes_keep_their_paths() {
        let dir = scenario_a("");
        let graph = build_import_graph(dir.path(), "pkg", &ScanConfig::default()).unwrap();
        assert_eq!(
            graph.node("pkg.sub.b").unwrap().path,
            dir.path().join("sub").join("b.py")
        );
    }

    #[test]
    fn test_parse_failure_aborts_build() {
        let dir = scenario_a("import pkg.sub.b\n");
        write(dir.path(), "sub/broken.py", "def oops(:\n");

        let err = build_import_graph(dir.path(), "pkg", &ScanConfig::default()).unwrap_err();
        match err {
            ReconError::Syntax { path, .. } => assert!(path.ends_with("sub/broken.py")),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_file_aborts_build() {
        let dir = scenario_a("");
        fs::write(dir.path().join("latin.py"), [0x63, 0x61, 0x66, 0xe9, 0x0a]).unwrap();

        let err = build_import_graph(dir.path(), "pkg", &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ReconError::Read { .. }));
    }
}
