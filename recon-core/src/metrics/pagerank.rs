//! PageRank centrality on the undirected projection of a dependency graph.
//!
//! # Algorithm
//!
//! Edge direction is discarded first: `a -> b` and `b -> a` become one
//! undirected edge, and a self-loop makes a node its own neighbour. Each
//! undirected edge is then walked in both directions by the power method:
//!
//! ```text
//! PR(v) = (1 - d) / N + d * (Σ PR(u) / deg(u) + dangling / N)   for each u ~ v
//! ```
//!
//! where `d` is the damping factor and `dangling` is the rank mass held by
//! nodes without neighbours, which is spread uniformly over all nodes.
//!
//! Iteration stops when the L1 distance between successive rank vectors
//! drops below `N * tolerance`. Scores always sum to 1.

use std::collections::HashMap;
use tracing::{instrument, warn};

use crate::graph::DepGraph;

/// Configuration for PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a link vs teleporting).
    /// Default: 0.85.
    pub damping: f64,
    /// Per-node convergence threshold; the L1 delta is compared against
    /// `N * tolerance`.
    /// Default: 1e-6.
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

/// Result of a PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// PageRank scores: node name → score.
    pub scores: HashMap<String, f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

/// Compute PageRank over the undirected projection of `graph`.
///
/// A graph without edges yields the uniform distribution `1/N`. When the
/// iteration budget runs out a warning is logged and the last iterate is
/// returned.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn pagerank<N, E>(graph: &DepGraph<N, E>, config: &PageRankConfig) -> PageRankResult {
    let names: Vec<&str> = graph.nodes().map(|(name, _)| name).collect();
    let n = names.len();

    if n == 0 {
        return PageRankResult {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
        };
    }

    let index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, &s)| (s, i)).collect();
    let neighbors: Vec<Vec<usize>> = names
        .iter()
        .map(|name| {
            graph
                .undirected_neighbors(name)
                .into_iter()
                .filter_map(|nbr| index.get(nbr).copied())
                .collect()
        })
        .collect();
    let dangling: Vec<usize> = (0..n).filter(|&i| neighbors[i].is_empty()).collect();

    let n_f64 = n as f64;
    let teleport = (1.0 - config.damping) / n_f64;

    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let dangling_sum: f64 =
            config.damping * dangling.iter().map(|&i| ranks[i]).sum::<f64>() / n_f64;
        new_ranks.iter_mut().for_each(|r| *r = teleport + dangling_sum);

        for (u, nbrs) in neighbors.iter().enumerate() {
            if nbrs.is_empty() {
                continue;
            }
            let share = config.damping * ranks[u] / nbrs.len() as f64;
            for &v in nbrs {
                new_ranks[v] += share;
            }
        }

        let delta: f64 = ranks
            .iter()
            .zip(&new_ranks)
            .map(|(old, new)| (old - new).abs())
            .sum();
        std::mem::swap(&mut ranks, &mut new_ranks);

        if delta < n_f64 * config.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            iterations,
            "PageRank did not converge; using last iterate"
        );
    }

    let scores = names
        .iter()
        .zip(ranks)
        .map(|(name, rank)| ((*name).to_string(), rank))
        .collect();

    PageRankResult {
        scores,
        iterations,
        converged,
    }
}
