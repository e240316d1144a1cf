//! Rule-based graph pruning.
//!
//! A node survives when it lives under the namespace, its name matches no
//! noise pattern, and every metric reaches its threshold. The result is the
//! subgraph induced by the survivors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ReconError, Result};
use crate::graph::{DepGraph, NodeMetrics};

/// Name patterns that mark test, tooling and boilerplate modules.
pub const DEFAULT_NOISE_PATTERNS: &[&str] = &[
    r"(^|\.)tests?($|\.)",
    r"(^|\.)scripts?($|\.)",
    r"(^|\.)notebooks?($|\.)",
    r"(^|\.)examples?($|\.)",
    r"(^|\.)demos?($|\.)",
    r"(^|\.)utils?($|\.)",
    r"(^|\.)helpers?($|\.)",
    r"(^|\.)migrations?($|\.)",
    r"(^|\.)configs?($|\.)",
    r"(^|\.)docs?($|\.)",
    r"(^|\.)fixtures?($|\.)",
    r"(^|\.)seed($|\.)",
    r"(^|\.)__init__$",
];

static DEFAULT_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEFAULT_NOISE_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Ordered list of regexes; a module matching any of them is noise.
///
/// Patterns are searched anywhere in the dotted name and are
/// case-sensitive.
#[derive(Debug, Clone)]
pub struct NoisePatterns {
    patterns: Vec<Regex>,
}

impl Default for NoisePatterns {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_NOISE.clone(),
        }
    }
}

impl NoisePatterns {
    /// Compile a custom pattern list.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| ReconError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// A list that matches nothing.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn is_noise(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Minimum metric values a node must reach to survive pruning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PruneThresholds {
    pub min_loc: u64,
    pub min_cc: u64,
    pub min_degree: u64,
    pub min_pagerank: f64,
}

impl Default for PruneThresholds {
    fn default() -> Self {
        Self {
            min_loc: 20,
            min_cc: 2,
            min_degree: 2,
            min_pagerank: 0.01,
        }
    }
}

impl PruneThresholds {
    /// Thresholds that every node passes.
    pub fn permissive() -> Self {
        Self {
            min_loc: 0,
            min_cc: 0,
            min_degree: 0,
            min_pagerank: 0.0,
        }
    }
}

/// Whether `name` is the namespace itself or lives below it.
pub fn in_namespace(name: &str, namespace: &str) -> bool {
    name == namespace
        || name
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Keep the nodes that pass every rule, plus the edges between them.
#[instrument(skip(graph, thresholds, noise), fields(nodes = graph.node_count()))]
pub fn prune_graph<N, E>(
    graph: &DepGraph<N, E>,
    namespace: &str,
    thresholds: &PruneThresholds,
    noise: &NoisePatterns,
) -> DepGraph<N, E>
where
    N: NodeMetrics + Clone,
    E: Clone,
{
    let pruned = graph.induced_subgraph(|name, node| {
        if !in_namespace(name, namespace) || noise.is_noise(name) {
            return false;
        }
        let m = node.metrics();
        m.loc >= thresholds.min_loc
            && m.cc >= thresholds.min_cc
            && m.degree >= thresholds.min_degree
            && m.pagerank >= thresholds.min_pagerank
    });
    debug!(
        "Kept {} of {} nodes",
        pruned.node_count(),
        graph.node_count()
    );
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Metrics, ModuleGraph, ModuleNode};
    use proptest::prelude::*;

    fn node(loc: u64, cc: u64, degree: u64, pagerank: f64) -> ModuleNode {
        ModuleNode {
            path: "x.py".into(),
            metrics: Metrics {
                loc,
                cc,
                degree,
                pagerank,
            },
        }
    }

    fn names<N, E>(graph: &DepGraph<N, E>) -> Vec<&str> {
        graph.nodes().map(|(name, _)| name).collect()
    }

    #[test]
    fn test_default_noise_patterns() {
        let noise = NoisePatterns::default();
        assert_eq!(noise.len(), DEFAULT_NOISE_PATTERNS.len());

        for name in [
            "pkg.tests.test_a",
            "pkg.test",
            "tests",
            "pkg.util",
            "pkg.utils.strings",
            "pkg.sub.__init__",
            "pkg.seed",
            "pkg.docs",
            "pkg.migrations.v1",
        ] {
            assert!(noise.is_noise(name), "{name} should be noise");
        }

        for name in [
            "pkg.testing",
            "pkg.contest",
            "pkg.utility",
            "pkg.seeds",
            "pkg.Tests",
            "pkg.model.user",
            "pkg.__init__x",
        ] {
            assert!(!noise.is_noise(name), "{name} should not be noise");
        }
    }

    #[test]
    fn test_custom_patterns() {
        let noise = NoisePatterns::new(["legacy", r"\.v\d+$"]).unwrap();
        assert!(noise.is_noise("pkg.legacy.api"));
        assert!(noise.is_noise("pkg.api.v2"));
        assert!(!noise.is_noise("pkg.tests"));
        assert!(!NoisePatterns::none().is_noise("pkg.tests"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = NoisePatterns::new(["(unclosed"]).unwrap_err();
        assert!(matches!(err, ReconError::InvalidPattern { pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_in_namespace() {
        assert!(in_namespace("pkg", "pkg"));
        assert!(in_namespace("pkg.a", "pkg"));
        assert!(!in_namespace("pkgx", "pkg"));
        assert!(!in_namespace("pkgx.a", "pkg"));
        assert!(!in_namespace("other.pkg", "pkg"));
    }

    #[test]
    fn test_prune_scenario() {
        // pkg.a passes everything, pkg.b has too few lines, pkg.tests.t is
        // noise, other.c is outside the namespace.
        let mut graph = ModuleGraph::new();
        graph.add_node("pkg.a", node(50, 3, 2, 0.4));
        graph.add_node("pkg.b", node(10, 3, 2, 0.3));
        graph.add_node("pkg.tests.t", node(99, 9, 9, 0.9));
        graph.add_node("other.c", node(99, 9, 9, 0.9));
        graph.add_node("pkg.d", node(30, 2, 2, 0.2));
        graph.add_edge("pkg.a", "pkg.b", ());
        graph.add_edge("pkg.a", "pkg.d", ());
        graph.add_edge("pkg.tests.t", "pkg.a", ());

        let pruned = prune_graph(
            &graph,
            "pkg",
            &PruneThresholds {
                min_loc: 20,
                min_cc: 2,
                min_degree: 2,
                min_pagerank: 0.1,
            },
            &NoisePatterns::default(),
        );

        assert_eq!(names(&pruned), vec!["pkg.a", "pkg.d"]);
        let edges: Vec<_> = pruned.edges().map(|(f, t, _)| (f, t)).collect();
        assert_eq!(edges, vec![("pkg.a", "pkg.d")]);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let mut graph = ModuleGraph::new();
        graph.add_node("pkg.a", node(20, 2, 2, 0.01));
        let pruned = prune_graph(
            &graph,
            "pkg",
            &PruneThresholds::default(),
            &NoisePatterns::default(),
        );
        assert_eq!(pruned.node_count(), 1);
    }

    #[test]
    fn test_permissive_keeps_namespace_only() {
        let mut graph = ModuleGraph::new();
        graph.add_node("pkg", node(0, 0, 0, 0.0));
        graph.add_node("pkg.a", node(0, 0, 0, 0.0));
        graph.add_node("pkgx.a", node(0, 0, 0, 0.0));
        let pruned = prune_graph(
            &graph,
            "pkg",
            &PruneThresholds::permissive(),
            &NoisePatterns::none(),
        );
        assert_eq!(names(&pruned), vec!["pkg", "pkg.a"]);
    }

    fn arb_graph() -> impl Strategy<Value = ModuleGraph> {
        let node = (0u64..100, 0u64..10, 0u64..6, 0.0f64..1.0);
        (
            proptest::collection::vec(node, 1..12),
            proptest::collection::vec((0usize..12, 0usize..12), 0..30),
        )
            .prop_map(|(nodes, edges)| {
                let mut graph = ModuleGraph::new();
                let count = nodes.len();
                for (i, (loc, cc, degree, pagerank)) in nodes.into_iter().enumerate() {
                    graph.add_node(format!("pkg.m{i}"), self::node(loc, cc, degree, pagerank));
                }
                for (from, to) in edges {
                    graph.add_edge(
                        &format!("pkg.m{}", from % count),
                        &format!("pkg.m{}", to % count),
                        (),
                    );
                }
                graph
            })
    }

    proptest! {
        #[test]
        fn prop_raising_thresholds_never_adds_nodes(
            graph in arb_graph(),
            loc in 0u64..100,
            cc in 0u64..10,
            degree in 0u64..6,
            pagerank in 0.0f64..1.0,
            bump in 0u64..20,
        ) {
            let noise = NoisePatterns::default();
            let low = PruneThresholds { min_loc: loc, min_cc: cc, min_degree: degree, min_pagerank: pagerank };
            let high = PruneThresholds {
                min_loc: loc + bump,
                min_cc: cc + bump / 4,
                min_degree: degree + bump / 8,
                min_pagerank: pagerank + bump as f64 / 100.0,
            };

            let kept_low = prune_graph(&graph, "pkg", &low, &noise);
            let kept_high = prune_graph(&graph, "pkg", &high, &noise);

            for (name, _) in kept_high.nodes() {
                prop_assert!(kept_low.contains_node(name));
            }
            for (from, to, _) in kept_high.edges() {
                prop_assert!(kept_low.contains_edge(from, to));
            }
        }
    }
}
