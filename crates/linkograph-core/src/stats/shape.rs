//! Whole-graph shape metrics

use serde::{Deserialize, Serialize};

use super::slice::{link_entropy, LinkEntropyOptions};
use crate::linkograph::Linkograph;

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Longest forelink span of each node (0 for nodes without forelinks)
pub fn link_differences(linko: &Linkograph) -> Vec<usize> {
    linko
        .iter()
        .enumerate()
        .map(|(index, node)| node.forelinks.last().map_or(0, |last| last.saturating_sub(index)))
        .collect()
}

/// Mean of [`link_differences`]
pub fn summary_difference(linko: &Linkograph) -> Option<f64> {
    let differences: Vec<f64> = link_differences(linko).into_iter().map(|d| d as f64).collect();
    mean(&differences)
}

/// Average share of earlier links still open over each position
///
/// Walking from node 2 on, each step records how many of the longest
/// forelinks seen so far reach past the current position, relative to the
/// number of positions walked. The first two nodes are not inspected.
pub fn top_cover(linko: &Linkograph) -> Option<f64> {
    if linko.is_empty() {
        return None;
    }

    let mut ongoing: Vec<usize> = Vec::new();
    let mut cover = vec![0.0];
    for (step, node) in linko.iter().skip(2).enumerate() {
        let step = step + 1;
        cover.push(ongoing.len() as f64 / step as f64);
        if let Some(&last) = node.forelinks.last() {
            ongoing.push(last);
        }
        ongoing.retain(|&end| end > step + 1);
    }

    mean(&cover)
}

/// Mean share of the graph covered by a node's forelinks
///
/// A link from node `i` to `f` covers `f - i + 1` nodes. Coverage is averaged
/// per node, then across nodes with forelinks; node 0 is not considered.
pub fn mean_link_coverage(linko: &Linkograph) -> Option<f64> {
    let size = linko.len() as f64;
    let per_node: Vec<f64> = linko
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, node)| {
            let ratios: Vec<f64> = node
                .forelinks
                .iter()
                .map(|&fore| (fore + 1).saturating_sub(index) as f64 / size)
                .collect();
            mean(&ratios)
        })
        .collect();

    mean(&per_node)
}

/// Population standard deviation of the per-node link entropies
pub fn entropy_deviation(linko: &Linkograph) -> Option<f64> {
    let entropies: Vec<f64> = link_entropy(linko, &LinkEntropyOptions::default())
        .into_iter()
        .map(|v| v.value)
        .collect();
    let center = mean(&entropies)?;
    let squares: Vec<f64> = entropies.iter().map(|e| (e - center).powi(2)).collect();
    mean(&squares).map(f64::sqrt)
}

/// Nodes with more than `threshold` links in total
pub fn count_critical_nodes(linko: &Linkograph, threshold: usize) -> usize {
    linko.iter().filter(|node| node.degree() > threshold).count()
}

/// Link positions viewed as points: x is the midpoint, y the span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianStatistics {
    pub x_mean: f64,
    pub x_sum: f64,
    pub x_range: f64,
    pub y_mean: f64,
    pub y_sum: f64,
    pub y_range: f64,
}

/// Mean, sum and range of `values`
fn summarize(values: &[f64]) -> Option<(f64, f64, f64)> {
    let center = mean(values)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((center, values.iter().sum(), max - min))
}

/// Summary of link midpoints and spans; `None` without links
pub fn cartesian_statistics(linko: &Linkograph) -> Option<CartesianStatistics> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = linko
        .iter()
        .enumerate()
        .flat_map(|(index, node)| {
            node.forelinks.iter().map(move |&fore| {
                (
                    (index + fore) as f64 / 2.0,
                    fore.saturating_sub(index) as f64,
                )
            })
        })
        .unzip();

    let (x_mean, x_sum, x_range) = summarize(&xs)?;
    let (y_mean, y_sum, y_range) = summarize(&ys)?;

    Some(CartesianStatistics {
        x_mean,
        x_sum,
        x_range,
        y_mean,
        y_sum,
        y_range,
    })
}
