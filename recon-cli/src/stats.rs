//! Distribution statistics for threshold selection.
//!
//! Thresholds can be absolute or a percentile of the corpus's own metric
//! distribution; [`resolve_thresholds`] turns either form into the concrete
//! [`PruneThresholds`] the pruner consumes.

use recon_core::{MetricMaps, PruneThresholds};
use serde::Serialize;

/// Percentiles reported by `recon stats`.
pub const REPORTED_PERCENTILES: [f64; 5] = [25.0, 50.0, 75.0, 85.0, 90.0];

/// The `p`-th percentile of `values`, 0 ≤ p ≤ 100.
///
/// Linear interpolation between the two closest ranks. An empty input
/// yields 0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Percentile of an integer metric, rounded up.
///
/// `metric >= ceil(p)` keeps exactly the values `metric >= p` would. This is
/// deliberately stricter than truncating with `as u64`, which would let one
/// extra step of values through.
pub fn integer_percentile<'a, I>(values: I, p: f64) -> u64
where
    I: IntoIterator<Item = &'a u64>,
{
    let values: Vec<f64> = values.into_iter().map(|&v| v as f64).collect();
    percentile(&values, p).ceil() as u64
}

/// A threshold given either as a value or as a percentile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold<T> {
    Absolute(T),
    Percentile(f64),
}

/// Per-metric threshold choices; `None` falls back to the default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdSpec {
    pub loc: Option<Threshold<u64>>,
    pub cc: Option<Threshold<u64>>,
    pub degree: Option<Threshold<u64>>,
    pub pagerank: Option<Threshold<f64>>,
}

fn resolve_int(
    threshold: Option<Threshold<u64>>,
    values: &std::collections::HashMap<String, u64>,
    default: u64,
) -> u64 {
    match threshold {
        Some(Threshold::Absolute(v)) => v,
        Some(Threshold::Percentile(p)) => integer_percentile(values.values(), p),
        None => default,
    }
}

/// Turn requested thresholds into concrete values against the given distributions.
pub fn resolve_thresholds(spec: &ThresholdSpec, maps: &MetricMaps) -> PruneThresholds {
    let defaults = PruneThresholds::default();
    let pagerank: Vec<f64> = maps.pagerank.values().copied().collect();

    PruneThresholds {
        min_loc: resolve_int(spec.loc, &maps.loc, defaults.min_loc),
        min_cc: resolve_int(spec.cc, &maps.cc, defaults.min_cc),
        min_degree: resolve_int(spec.degree, &maps.degree, defaults.min_degree),
        min_pagerank: match spec.pagerank {
            Some(Threshold::Absolute(v)) => v,
            Some(Threshold::Percentile(p)) => percentile(&pagerank, p),
            None => defaults.min_pagerank,
        },
    }
}

/// Percentile summary of one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub metric: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p85: f64,
    pub p90: f64,
}

impl MetricSummary {
    pub fn new(metric: &str, values: &[f64]) -> Self {
        let [p25, p50, p75, p85, p90] = REPORTED_PERCENTILES.map(|p| percentile(values, p));
        Self {
            metric: metric.to_string(),
            count: values.len(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min).min(p25),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max).max(p90),
            p25,
            p50,
            p75,
            p85,
            p90,
        }
    }
}

/// Summaries for all four metrics, in a fixed order.
pub fn summarize(maps: &MetricMaps) -> Vec<MetricSummary> {
    let as_f64 = |m: &std::collections::HashMap<String, u64>| -> Vec<f64> {
        m.values().map(|&v| v as f64).collect()
    };
    vec![
        MetricSummary::new("loc", &as_f64(&maps.loc)),
        MetricSummary::new("cc", &as_f64(&maps.cc)),
        MetricSummary::new("degree", &as_f64(&maps.degree)),
        MetricSummary::new("pagerank", &maps.pagerank.values().copied().collect::<Vec<_>>()),
    ]
}
