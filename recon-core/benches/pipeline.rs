//! Benchmarks for the recovery pipeline stages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recon_core::metrics::complexity;
use recon_core::parser::python;
use recon_core::{
    build_import_graph, collapse_to_packages, compute_metrics, prune_graph, NoisePatterns,
    PageRankConfig, PruneThresholds, ScanConfig,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE: &str = r#"
import os
from pathlib import Path
from .models import User
from ..core import session

class MyClass(BaseClass):
    """A test class with various methods."""

    def __init__(self, name: str, value: int = 0):
        self.name = name
        self.value = value

    def process(self, data: list[str]) -> dict[str, int]:
        result = {}
        for item in data:
            if item.startswith("_") or not item:
                continue
            result[item] = len(item)
        return result

def main():
    obj = MyClass("test", 42)
    return [x for x in range(10) if x % 2]
"#;

/// Synthetic package: `packages` subpackages of `modules` modules each,
/// every module importing its neighbour and one module of the next package.
fn synthetic_tree(packages: usize, modules: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("__init__.py"), "").unwrap();
    for p in 0..packages {
        let pkg_dir = dir.path().join(format!("p{p}"));
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("__init__.py"), "").unwrap();
        for m in 0..modules {
            let source = format!(
                "from .m{} import x\nimport app.p{}.m0\n{SAMPLE}",
                (m + 1) % modules,
                (p + 1) % packages
            );
            fs::write(pkg_dir.join(format!("m{m}.py")), source).unwrap();
        }
    }
    dir
}

fn bench_parse_python(c: &mut Criterion) {
    c.bench_function("parse_and_extract_imports", |b| {
        b.iter(|| {
            let tree = python::parse(black_box(SAMPLE), Path::new("bench.py")).unwrap();
            black_box(python::extract_imports(&tree, SAMPLE))
        })
    });

    let tree = python::parse(SAMPLE, Path::new("bench.py")).unwrap();
    c.bench_function("cyclomatic_complexity", |b| {
        b.iter(|| black_box(complexity::total_complexity(&tree, SAMPLE)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let dir = synthetic_tree(20, 25);

    c.bench_function("build_import_graph_500_modules", |b| {
        b.iter(|| build_import_graph(dir.path(), "app", &ScanConfig::default()).unwrap())
    });

    let mut graph = build_import_graph(dir.path(), "app", &ScanConfig::default()).unwrap();
    compute_metrics(&mut graph, &PageRankConfig::default()).unwrap();

    c.bench_function("prune_and_collapse_500_modules", |b| {
        b.iter(|| {
            let pruned = prune_graph(
                &graph,
                "app",
                &PruneThresholds::permissive(),
                &NoisePatterns::default(),
            );
            black_box(collapse_to_packages(&pruned, 2))
        })
    });
}

criterion_group!(benches, bench_parse_python, bench_pipeline);
criterion_main!(benches);
