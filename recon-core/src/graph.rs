//! Directed dependency graph with typed node and edge attributes.
//!
//! `DepGraph` is a plain adjacency map keyed by dotted names. It keeps both
//! directions of every edge so degree queries and the undirected projection
//! used by PageRank are O(neighbours).
//!
//! # Key Features
//!
//! - **Insert-if-absent**: adding an existing node or edge is a no-op, which
//!   gives module-level edge de-duplication for free.
//! - **Deterministic iteration**: nodes and edges iterate in name order, so
//!   reports and exports are stable across runs.
//! - **Typed attributes**: module graphs carry [`ModuleNode`], package graphs
//!   carry [`Metrics`] per node and [`PackageEdge`] per edge.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Size, complexity and centrality scores attached to a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    /// Non-blank source lines.
    pub loc: u64,
    /// Summed cyclomatic complexity of all blocks.
    pub cc: u64,
    /// In-degree plus out-degree in the module graph.
    pub degree: u64,
    /// PageRank on the undirected projection of the module graph.
    pub pagerank: f64,
}

impl Metrics {
    /// Add another record into this one, field by field.
    pub fn accumulate(&mut self, other: &Metrics) {
        self.loc += other.loc;
        self.cc += other.cc;
        self.degree += other.degree;
        self.pagerank += other.pagerank;
    }
}

/// A module discovered on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModuleNode {
    /// Source file backing the module.
    pub path: PathBuf,
    /// Filled in by [`crate::metrics`]; zero until then.
    pub metrics: Metrics,
}

impl ModuleNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            metrics: Metrics::default(),
        }
    }
}

/// A collapsed edge between two packages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PackageEdge {
    /// Number of module-level edges folded into this one.
    pub weight: u32,
}

/// Module-level import graph.
pub type ModuleGraph = DepGraph<ModuleNode, ()>;

/// Package-level graph produced by [`crate::collapse`].
pub type PackageGraph = DepGraph<Metrics, PackageEdge>;

/// Node records that expose a [`Metrics`] view.
pub trait NodeMetrics {
    fn metrics(&self) -> &Metrics;

    /// Backing source file, if the node has one.
    fn source_path(&self) -> Option<&Path> {
        None
    }
}

impl NodeMetrics for ModuleNode {
    fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

impl NodeMetrics for Metrics {
    fn metrics(&self) -> &Metrics {
        self
    }
}

/// Edge records that expose an import count.
pub trait EdgeWeight {
    fn weight(&self) -> u32;
}

impl EdgeWeight for () {
    fn weight(&self) -> u32 {
        1
    }
}

impl EdgeWeight for PackageEdge {
    fn weight(&self) -> u32 {
        self.weight
    }
}

/// Directed graph keyed by dotted names.
///
/// Holds at most one edge per ordered pair. Self-loops are representable
/// (a module importing itself) and count twice towards its degree.
#[derive(Clone, Debug, PartialEq)]
pub struct DepGraph<N, E> {
    nodes: BTreeMap<String, N>,
    outgoing: BTreeMap<String, BTreeMap<String, E>>,
    incoming: BTreeMap<String, BTreeSet<String>>,
}

impl<N, E> Default for DepGraph<N, E> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
        }
    }
}

impl<N, E> DepGraph<N, E> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless one with the same name exists.
    ///
    /// Returns `true` if the node was inserted. Existing attributes are left
    /// untouched.
    pub fn add_node(&mut self, name: impl Into<String>, attrs: N) -> bool {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            return false;
        }
        self.nodes.insert(name, attrs);
        true
    }

    /// Add an edge unless it already exists.
    ///
    /// Missing endpoints are created with default attributes. Returns `true`
    /// if the edge was inserted.
    pub fn add_edge(&mut self, from: &str, to: &str, attrs: E) -> bool
    where
        N: Default,
    {
        if self.contains_edge(from, to) {
            return false;
        }
        self.add_node(from, N::default());
        self.add_node(to, N::default());
        self.outgoing
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), attrs);
        self.incoming
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
        true
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.outgoing
            .get(from)
            .is_some_and(|targets| targets.contains_key(to))
    }

    pub fn node(&self, name: &str) -> Option<&N> {
        self.nodes.get(name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut N> {
        self.nodes.get_mut(name)
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&E> {
        self.outgoing.get(from)?.get(to)
    }

    pub fn edge_mut(&mut self, from: &str, to: &str) -> Option<&mut E> {
        self.outgoing.get_mut(from)?.get_mut(to)
    }

    /// Iterate over `(name, attrs)` in name order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &N)> {
        self.nodes.iter().map(|(name, attrs)| (name.as_str(), attrs))
    }

    /// Iterate over mutable node attributes in name order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = (&str, &mut N)> {
        self.nodes
            .iter_mut()
            .map(|(name, attrs)| (name.as_str(), attrs))
    }

    /// Iterate over `(from, to, attrs)` ordered by source then target.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &E)> {
        self.outgoing.iter().flat_map(|(from, targets)| {
            targets
                .iter()
                .map(move |(to, attrs)| (from.as_str(), to.as_str(), attrs))
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes this node depends on.
    pub fn successors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.outgoing
            .get(name)
            .into_iter()
            .flat_map(|targets| targets.keys().map(String::as_str))
    }

    /// Nodes that depend on this node.
    pub fn predecessors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.incoming
            .get(name)
            .into_iter()
            .flat_map(|sources| sources.iter().map(String::as_str))
    }

    pub fn out_degree(&self, name: &str) -> usize {
        self.outgoing.get(name).map_or(0, BTreeMap::len)
    }

    pub fn in_degree(&self, name: &str) -> usize {
        self.incoming.get(name).map_or(0, BTreeSet::len)
    }

    /// In-degree plus out-degree.
    pub fn degree(&self, name: &str) -> usize {
        self.in_degree(name) + self.out_degree(name)
    }

    /// Neighbours in the undirected projection.
    ///
    /// Reciprocal edges collapse to a single neighbour; a self-loop makes the
    /// node its own neighbour.
    pub fn undirected_neighbors(&self, name: &str) -> BTreeSet<&str> {
        self.successors(name).chain(self.predecessors(name)).collect()
    }

    /// Subgraph induced by the nodes `keep` accepts.
    ///
    /// An edge survives only if both endpoints survive.
    pub fn induced_subgraph<F>(&self, mut keep: F) -> Self
    where
        N: Clone,
        E: Clone,
        F: FnMut(&str, &N) -> bool,
    {
        let mut sub = Self::new();
        for (name, attrs) in self.nodes() {
            if keep(name, attrs) {
                sub.nodes.insert(name.to_string(), attrs.clone());
            }
        }
        for (from, to, attrs) in self.edges() {
            if sub.contains_node(from) && sub.contains_node(to) {
                sub.outgoing
                    .entry(from.to_string())
                    .or_default()
                    .insert(to.to_string(), attrs.clone());
                sub.incoming
                    .entry(to.to_string())
                    .or_default()
                    .insert(from.to_string());
            }
        }
        sub
    }
}
