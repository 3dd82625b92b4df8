//! Sub-range search and graph comparison

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{graph_entropy, links, percentage_of_links, total_links, Window};
use crate::error::{Error, Result};
use crate::linkograph::Linkograph;

/// Windowed whole-graph metrics usable with [`subgraph_metric`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphMetric {
    Links,
    PercentageOfLinks,
    GraphEntropy,
}

impl GraphMetric {
    pub fn evaluate(&self, linko: &Linkograph, window: Window) -> Option<f64> {
        match self {
            Self::Links => Some(links(linko, window) as f64),
            Self::PercentageOfLinks => percentage_of_links(linko, window),
            Self::GraphEntropy => Some(graph_entropy(linko, window)),
        }
    }
}

impl fmt::Display for GraphMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Links => write!(f, "links"),
            Self::PercentageOfLinks => write!(f, "percentage-of-links"),
            Self::GraphEntropy => write!(f, "graph-entropy"),
        }
    }
}

impl FromStr for GraphMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "links" => Ok(Self::Links),
            "percentage-of-links" | "density" => Ok(Self::PercentageOfLinks),
            "graph-entropy" | "entropy" => Ok(Self::GraphEntropy),
            other => Err(format!("Unknown graph metric: {}", other)),
        }
    }
}

/// Sub-range search parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubgraphQuery {
    /// Smallest sub-range size
    #[serde(default = "default_min_size")]
    pub min_size: usize,

    /// Largest sub-range size (None = graph size)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,

    /// Advance between consecutive lower bounds
    #[serde(default = "default_step")]
    pub step: usize,

    /// Inclusive lower threshold on the metric value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_threshold: Option<f64>,

    /// Inclusive upper threshold on the metric value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_threshold: Option<f64>,

    /// Region searched
    #[serde(default)]
    pub window: Window,
}

fn default_min_size() -> usize {
    2
}

fn default_step() -> usize {
    1
}

impl Default for SubgraphQuery {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: None,
            step: default_step(),
            lower_threshold: None,
            upper_threshold: None,
            window: Window::default(),
        }
    }
}

impl SubgraphQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sizes(mut self, min_size: usize, max_size: Option<usize>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn with_thresholds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower_threshold = lower;
        self.upper_threshold = upper;
        self
    }

    pub fn within(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    fn accepts(&self, value: f64) -> bool {
        self.lower_threshold.map_or(true, |lower| value >= lower)
            && self.upper_threshold.map_or(true, |upper| value <= upper)
    }
}

/// A sub-range `[lower, upper]` and its metric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubgraphValue {
    pub lower: usize,
    pub upper: usize,
    pub value: f64,
}

/// Evaluate `metric` over every contiguous sub-range of the query window
///
/// Lower bounds advance by `step`; for each, every size from `min_size` to
/// `max_size` that fits in the window is tried. Ranges whose metric is
/// undefined or outside the thresholds are skipped.
pub fn subgraph_metric<F>(linko: &Linkograph, query: &SubgraphQuery, metric: F) -> Vec<SubgraphValue>
where
    F: Fn(&Linkograph, Window) -> Option<f64>,
{
    let bounds = query.window.resolve(linko.len());
    let min_size = query.min_size.max(1);
    let max_size = query.max_size.map_or(linko.len(), |max| max.min(linko.len()));
    let step = query.step.max(1);

    let Some(last_lower) = bounds.end.checked_sub(min_size) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for lower in (bounds.lower..=last_lower).step_by(step) {
        let upper_end = lower.saturating_add(max_size).min(bounds.end);
        for upper in (lower + min_size - 1)..upper_end {
            let window = Window::new(lower as i64, upper as i64);
            let Some(value) = metric(linko, window) else {
                continue;
            };
            if query.accepts(value) {
                found.push(SubgraphValue { lower, upper, value });
            }
        }
    }

    tracing::debug!("Subgraph search matched {} ranges", found.len());
    found
}

/// Link-level agreement between two linkographs of the same size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Links of the first graph missing from the second
    pub underlinks: usize,

    /// Links of the second graph missing from the first
    pub overlinks: usize,

    /// Fraction of possible links on which the graphs agree
    pub accuracy: f64,
}

/// Compare the links of two linkographs node by node
pub fn similarity(first: &Linkograph, second: &Linkograph) -> Result<Similarity> {
    if first.len() != second.len() {
        return Err(Error::SizeMismatch {
            left: first.len(),
            right: second.len(),
        });
    }

    let possible = total_links(first.len());
    if possible == 0 {
        return Ok(Similarity {
            underlinks: 0,
            overlinks: 0,
            accuracy: 1.0,
        });
    }

    // Only forward links to existing nodes occupy one of the possible positions.
    let len = first.len();
    let mut underlinks = 0;
    let mut overlinks = 0;
    for (index, (a, b)) in first.iter().zip(second.iter()).enumerate() {
        let a: BTreeSet<usize> = a.forelinks.range(index + 1..len).copied().collect();
        let b: BTreeSet<usize> = b.forelinks.range(index + 1..len).copied().collect();
        underlinks += a.difference(&b).count();
        overlinks += b.difference(&a).count();
    }

    Ok(Similarity {
        underlinks,
        overlinks,
        accuracy: (possible - underlinks - overlinks) as f64 / possible as f64,
    })
}
