//! Per-node statistics over local link neighborhoods

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::complexity::t_complexity;
use super::{shannon_entropy, Window};
use crate::linkograph::{Linkograph, Node};

/// Which of a node's links a per-node statistic looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Back,
    Fore,
    #[default]
    Both,
}

impl LinkDirection {
    pub fn includes_back(self) -> bool {
        matches!(self, Self::Back | Self::Both)
    }

    pub fn includes_fore(self) -> bool {
        matches!(self, Self::Fore | Self::Both)
    }
}

impl FromStr for LinkDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "back" | "backlinks" => Ok(Self::Back),
            "fore" | "forelinks" => Ok(Self::Fore),
            "both" | "all" => Ok(Self::Both),
            other => Err(format!("Unknown link direction: {}", other)),
        }
    }
}

/// Neighborhood selection for per-node statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntropyOptions {
    #[serde(default)]
    pub direction: LinkDirection,

    /// Largest offset from a node considered part of its neighborhood
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<usize>,

    /// Clip every neighborhood to the window as well as to the graph
    #[serde(default)]
    pub restrict: bool,

    /// Nodes the statistic is reported for
    #[serde(default)]
    pub window: Window,
}

impl LinkEntropyOptions {
    pub fn new(direction: LinkDirection) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    pub fn with_delta(mut self, delta: usize) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn restricted(mut self) -> Self {
        self.restrict = true;
        self
    }

    pub fn within(mut self, window: Window) -> Self {
        self.window = window;
        self
    }
}

/// A per-node statistic paired with the node's index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeValue {
    pub index: usize,
    pub value: f64,
}

/// Drop the node indices
pub fn values(values: &[NodeValue]) -> Vec<f64> {
    values.iter().map(|v| v.value).collect()
}

/// Links of `node` landing in `[lower, upper]`
pub fn link_count(node: &Node, direction: LinkDirection, lower: usize, upper: usize) -> usize {
    if lower > upper {
        return 0;
    }
    let mut count = 0;
    if direction.includes_back() {
        count += node.backlinks.range(lower..=upper).count();
    }
    if direction.includes_fore() {
        count += node.forelinks.range(lower..=upper).count();
    }
    count
}

/// Possible links of the node at `current` within `[lower, upper]`
pub fn link_total(current: usize, direction: LinkDirection, lower: usize, upper: usize) -> usize {
    let mut total = 0;
    if direction.includes_back() {
        total += current.saturating_sub(lower);
    }
    if direction.includes_fore() {
        total += upper.saturating_sub(current);
    }
    total
}

/// Link presence bitstring of the node at `current` within `[lower, upper]`
///
/// One character per possible link, `1` when the link exists. Backlink
/// positions come first, then forelinks; the node's own position is skipped.
pub fn entry_to_string(
    node: &Node,
    current: usize,
    direction: LinkDirection,
    lower: usize,
    upper: usize,
) -> String {
    let mut bits = vec![b'0'; link_total(current, direction, lower, upper)];
    let mut shift = current + 1;

    if direction.includes_back() {
        for &back in node.backlinks.range(lower..) {
            if let Some(bit) = bits.get_mut(back - lower) {
                *bit = b'1';
            }
        }
        shift = lower + 1;
    }

    if direction.includes_fore() {
        for &fore in node.forelinks.range(..=upper) {
            if let Some(bit) = fore.checked_sub(shift).and_then(|i| bits.get_mut(i)) {
                *bit = b'1';
            }
        }
    }

    bits.into_iter().map(char::from).collect()
}

/// Evaluate `f(node, index, lower, upper)` over each node's neighborhood
fn apply_slice<F>(linko: &Linkograph, options: &LinkEntropyOptions, mut f: F) -> Vec<NodeValue>
where
    F: FnMut(&Node, usize, usize, usize) -> f64,
{
    let bounds = options.window.resolve(linko.len());
    let Some(window_last) = bounds.last() else {
        return Vec::new();
    };
    let graph_last = linko.len() - 1;
    let delta = options.delta.unwrap_or(graph_last);

    bounds
        .range()
        .map(|index| {
            let mut lower = index.saturating_sub(delta);
            let mut upper = index.saturating_add(delta).min(graph_last);
            if options.restrict {
                lower = lower.max(bounds.lower);
                upper = upper.min(window_last);
            }
            NodeValue {
                index,
                value: f(&linko.nodes[index], index, lower, upper),
            }
        })
        .collect()
}

/// Entropy of each node's local links against its local possible links
pub fn link_entropy(linko: &Linkograph, options: &LinkEntropyOptions) -> Vec<NodeValue> {
    let direction = options.direction;
    apply_slice(linko, options, |node, index, lower, upper| {
        shannon_entropy(
            link_count(node, direction, lower, upper),
            link_total(index, direction, lower, upper),
        )
    })
}

/// T-complexity of each node's local link bitstring
///
/// With `difference` the lower bound `log2(len)` of the bitstring is
/// subtracted; with `normalize` the result is divided by that bound.
pub fn link_t_complexity(
    linko: &Linkograph,
    options: &LinkEntropyOptions,
    difference: bool,
    normalize: bool,
) -> Vec<NodeValue> {
    let direction = options.direction;
    apply_slice(linko, options, |node, index, lower, upper| {
        let bits = entry_to_string(node, index, direction, lower, upper);
        let mut result = t_complexity(&bits);
        let bound = if bits.is_empty() {
            0.0
        } else {
            (bits.len() as f64).log2()
        };
        if difference {
            result -= bound;
        }
        if normalize && bound != 0.0 {
            result /= bound;
        }
        result
    })
}

/// Fraction of each node's local possible links that exist
pub fn link_percentages(linko: &Linkograph, options: &LinkEntropyOptions) -> Vec<NodeValue> {
    let direction = options.direction;
    apply_slice(linko, options, |node, index, lower, upper| {
        let count = link_count(node, direction, lower, upper);
        let total = link_total(index, direction, lower, upper).max(1);
        count as f64 / total as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkograph::tests::simple_linko;
    use crate::stats::assert_close;

    fn h(p: f64) -> f64 {
        -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
    }

    fn assert_all_close(actual: &[NodeValue], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_close(a.value, *e);
        }
    }

    #[test]
    fn test_fore_link_entropy() {
        let linko = simple_linko();
        let options = LinkEntropyOptions::new(LinkDirection::Fore);
        let expected = [h(0.75), h(2.0 / 3.0), 1.0, 0.0, 0.0];
        assert_all_close(&link_entropy(&linko, &options), &expected);

        let shifted = options.within(Window::full().with_lower(-1).with_upper(5));
        assert_all_close(&link_entropy(&linko, &shifted), &expected);

        let tail = options.within(Window::full().with_lower(1));
        let values = link_entropy(&linko, &tail);
        assert_eq!(values[0].index, 1);
        assert_all_close(&values, &expected[1..]);

        let middle = options.within(Window::new(2, 3));
        assert_all_close(&link_entropy(&linko, &middle), &[1.0, 0.0]);
    }

    #[test]
    fn test_back_and_both_link_entropy() {
        let linko = simple_linko();
        let back = LinkEntropyOptions::new(LinkDirection::Back);
        assert_all_close(
            &link_entropy(&linko, &back),
            &[0.0, 0.0, 1.0, h(2.0 / 3.0), h(0.75)],
        );

        let both = LinkEntropyOptions::new(LinkDirection::Both);
        assert_all_close(
            &link_entropy(&linko, &both),
            &[h(0.75), h(0.75), 1.0, h(0.75), h(0.75)],
        );
    }

    #[test]
    fn test_link_entropy_delta_and_restrict() {
        let linko = simple_linko();
        let delta = LinkEntropyOptions::new(LinkDirection::Both).with_delta(1);
        assert_all_close(&link_entropy(&linko, &delta), &[0.0, 1.0, 0.0, 1.0, 0.0]);

        let restricted = LinkEntropyOptions::new(LinkDirection::Fore)
            .restricted()
            .within(Window::new(1, 3));
        assert_all_close(&link_entropy(&linko, &restricted), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_link_entropy_empty() {
        let options = LinkEntropyOptions::default();
        assert!(link_entropy(&Linkograph::new(), &options).is_empty());
        assert!(link_entropy(&simple_linko(), &options.within(Window::new(3, 1))).is_empty());
    }

    #[test]
    fn test_entry_to_string() {
        let node = Node::new().with_backlinks([0, 1]).with_forelinks([5, 6, 7]);
        assert_eq!(entry_to_string(&node, 3, LinkDirection::Both, 0, 7), "1100111");
        assert_eq!(entry_to_string(&node, 3, LinkDirection::Back, 0, 7), "110");
        assert_eq!(entry_to_string(&node, 3, LinkDirection::Fore, 0, 7), "0111");
        assert_eq!(entry_to_string(&node, 3, LinkDirection::Both, 1, 6), "10011");
    }

    #[test]
    fn test_link_count_and_total() {
        let node = Node::new().with_backlinks([0, 1]).with_forelinks([5, 6, 7]);
        assert_eq!(link_count(&node, LinkDirection::Both, 1, 6), 3);
        assert_eq!(link_count(&node, LinkDirection::Fore, 6, 2), 0);
        assert_eq!(link_total(3, LinkDirection::Both, 1, 6), 5);
        assert_eq!(link_total(3, LinkDirection::Back, 1, 6), 2);
    }

    #[test]
    fn test_link_t_complexity() {
        let linko = simple_linko();
        let options = LinkEntropyOptions::new(LinkDirection::Fore);
        assert_all_close(
            &link_t_complexity(&linko, &options, false, false),
            &[2.0, 2.0, 1.0, 0.0, 0.0],
        );

        let adjusted = link_t_complexity(&linko, &options, true, false);
        assert_close(adjusted[0].value, 0.0);
        assert_close(adjusted[2].value, 0.0);

        let normalized = link_t_complexity(&linko, &options, false, true);
        assert_close(normalized[0].value, 1.0);
        assert_close(normalized[4].value, 0.0);
    }

    #[test]
    fn test_link_percentages() {
        let linko = simple_linko();
        let values = link_percentages(&linko, &LinkEntropyOptions::default());
        assert_all_close(&values, &[0.75, 0.75, 0.5, 0.75, 0.75]);

        let fore = link_percentages(&linko, &LinkEntropyOptions::new(LinkDirection::Fore));
        assert_close(fore[4].value, 0.0);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("fore".parse::<LinkDirection>(), Ok(LinkDirection::Fore));
        assert_eq!("BACK".parse::<LinkDirection>(), Ok(LinkDirection::Back));
        assert!("sideways".parse::<LinkDirection>().is_err());
    }
}
