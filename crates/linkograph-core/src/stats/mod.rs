//! Statistics over linkographs
//!
//! Every function here is pure. Windowed functions take a [`Window`] whose
//! bounds are inclusive, may be negative or past the end, and are clamped into
//! the graph before use.

mod complexity;
mod shape;
mod slice;
mod subgraph;

pub use complexity::{linkograph_to_bitstring, t_complexity};
pub use shape::{
    cartesian_statistics, count_critical_nodes, entropy_deviation, link_differences,
    mean_link_coverage, summary_difference, top_cover, CartesianStatistics,
};
pub use slice::{
    entry_to_string, link_count, link_entropy, link_percentages, link_t_complexity, link_total,
    values, LinkDirection, LinkEntropyOptions, NodeValue,
};
pub use subgraph::{similarity, subgraph_metric, GraphMetric, Similarity, SubgraphQuery, SubgraphValue};

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::linkograph::Linkograph;

/// Inclusive node window, `None` meaning the corresponding end of the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<i64>,
}

impl Window {
    /// The whole graph
    pub fn full() -> Self {
        Self::default()
    }

    pub fn new(lower: i64, upper: i64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn with_lower(mut self, lower: i64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, upper: i64) -> Self {
        self.upper = Some(upper);
        self
    }

    /// Clamp the window into a graph of `size` nodes
    pub fn resolve(&self, size: usize) -> Bounds {
        let end = match self.upper {
            None => size,
            Some(upper) if upper < 0 => 0,
            Some(upper) => usize::try_from(upper).map_or(size, |u| u.saturating_add(1).min(size)),
        };
        let lower = self
            .lower
            .map_or(0, |lower| usize::try_from(lower.max(0)).unwrap_or(usize::MAX))
            .min(end);

        Bounds { lower, end }
    }
}

/// A resolved window: nodes `lower..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub lower: usize,
    pub end: usize,
}

impl Bounds {
    pub fn len(&self) -> usize {
        self.end - self.lower
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.lower
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.lower..self.end).contains(&index)
    }

    /// Last node in the window (inclusive upper bound)
    pub fn last(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    pub fn range(&self) -> Range<usize> {
        self.lower..self.end
    }
}

/// Possible links among `n` nodes: `n(n-1)/2`
pub fn total_links(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Occurrences of each label within the window
///
/// A node with several labels counts once for each of them. Labels that do
/// not occur are absent from the map.
pub fn total_labels(linko: &Linkograph, window: Window) -> BTreeMap<String, usize> {
    let bounds = window.resolve(linko.len());
    let mut counts = BTreeMap::new();
    for node in &linko.nodes[bounds.range()] {
        for label in &node.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Fraction of window nodes carrying each label
pub fn percentage_of_entries(linko: &Linkograph, window: Window) -> BTreeMap<String, f64> {
    let bounds = window.resolve(linko.len());
    if bounds.is_empty() {
        return BTreeMap::new();
    }
    let size = bounds.len() as f64;
    total_labels(linko, window)
        .into_iter()
        .map(|(label, count)| (label, count as f64 / size))
        .collect()
}

/// Number of links with both endpoints inside the window
pub fn links(linko: &Linkograph, window: Window) -> usize {
    let bounds = window.resolve(linko.len());
    linko.nodes[bounds.range()]
        .iter()
        .map(|node| node.forelinks.range(..bounds.end).count())
        .sum()
}

/// Links in the window over the possible links; `None` below two nodes
pub fn percentage_of_links(linko: &Linkograph, window: Window) -> Option<f64> {
    let possible = total_links(window.resolve(linko.len()).len());
    if possible == 0 {
        return None;
    }
    Some(links(linko, window) as f64 / possible as f64)
}

/// Binary entropy of the ratio `linked / total`
///
/// Degenerate inputs (nothing linked, everything linked, or no possible
/// links) carry no information and give 0.
pub fn shannon_entropy(linked: usize, total: usize) -> f64 {
    if linked == 0 || total == 0 || linked >= total {
        return 0.0;
    }
    let p = linked as f64 / total as f64;
    let q = 1.0 - p;
    -p * p.log2() - q * q.log2()
}

/// Entropy of the window's links against every possible link
pub fn graph_entropy(linko: &Linkograph, window: Window) -> f64 {
    let possible = total_links(window.resolve(linko.len()).len());
    shannon_entropy(links(linko, window), possible)
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
