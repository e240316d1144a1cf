//! Package-level aggregation.
//!
//! Every module is mapped to the package named by its first `depth` dotted
//! segments. Edges that cross packages are counted into weighted package
//! edges; edges inside one package vanish. A package that ends up with no
//! cross-package edge is not materialized, even when it holds modules.

use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::graph::{DepGraph, EdgeWeight, NodeMetrics, PackageEdge, PackageGraph};

/// Package of `name` at the given depth: its first `depth` dotted segments.
///
/// Names shorter than `depth` are returned whole.
pub fn package_of(name: &str, depth: usize) -> String {
    name.split('.').take(depth).collect::<Vec<_>>().join(".")
}

/// Collapse a module graph into a package graph.
///
/// Package edge weight is the number of module edges folded into it (or the
/// sum of their weights when the input is itself a package graph). Package
/// metrics are the sums over every input node mapped to the package.
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn collapse_to_packages<N, E>(graph: &DepGraph<N, E>, depth: usize) -> PackageGraph
where
    N: NodeMetrics,
    E: EdgeWeight,
{
    let mut weights: BTreeMap<(String, String), u32> = BTreeMap::new();
    for (from, to, edge) in graph.edges() {
        let (pf, pt) = (package_of(from, depth), package_of(to, depth));
        if pf != pt {
            *weights.entry((pf, pt)).or_default() += edge.weight();
        }
    }

    let mut collapsed = PackageGraph::new();
    for ((pf, pt), weight) in weights {
        collapsed.add_edge(&pf, &pt, PackageEdge { weight });
    }

    for (name, node) in graph.nodes() {
        if let Some(total) = collapsed.node_mut(&package_of(name, depth)) {
            total.accumulate(node.metrics());
        }
    }

    debug!(
        "Collapsed {} modules into {} packages",
        graph.node_count(),
        collapsed.node_count()
    );
    collapsed
}
