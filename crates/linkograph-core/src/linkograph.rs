//! Linkograph and node types

use std::collections::{BTreeMap, BTreeSet};

/// Label compatibility relation: `b ∈ ontology[a]` lets an earlier `a` link to a later `b`
pub type Ontology = BTreeMap<String, Vec<String>>;

/// Label to ascending node indices
pub type InverseLabeling = BTreeMap<String, Vec<usize>>;

/// One event at a fixed position in time order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Abstraction classes assigned to the event
    pub labels: BTreeSet<String>,

    /// Earlier nodes linking to this node
    pub backlinks: BTreeSet<usize>,

    /// Later nodes this node links to
    pub forelinks: BTreeSet<usize>,

    /// Optional external identifier carried on the wire
    pub identifier: Option<String>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_backlinks(mut self, backlinks: impl IntoIterator<Item = usize>) -> Self {
        self.backlinks = backlinks.into_iter().collect();
        self
    }

    pub fn with_forelinks(mut self, forelinks: impl IntoIterator<Item = usize>) -> Self {
        self.forelinks = forelinks.into_iter().collect();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Total number of links touching this node
    pub fn degree(&self) -> usize {
        self.backlinks.len() + self.forelinks.len()
    }
}

/// Time-ordered nodes plus the vocabulary of known labels
///
/// Links only ever run from a lower index to a strictly higher one, and every
/// forelink `i -> j` is mirrored by a backlink `j <- i`. The vocabulary order
/// is used for display and enumeration, never for semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linkograph {
    pub vocabulary: Vec<String>,
    pub nodes: Vec<Node>,
}

impl Linkograph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Linkograph of `size` unlabeled, unlinked nodes
    pub fn with_size(size: usize) -> Self {
        Self {
            vocabulary: Vec::new(),
            nodes: vec![Node::default(); size],
        }
    }

    pub fn with_vocabulary<I, S>(mut self, vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = vocabulary.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Add the link `from -> to`, recording both endpoints
    ///
    /// Links that do not point strictly forward, or that reference a node
    /// outside the graph, are ignored and reported as `false`.
    pub fn add_link(&mut self, from: usize, to: usize) -> bool {
        if from >= to || to >= self.nodes.len() {
            return false;
        }
        self.nodes[from].forelinks.insert(to);
        self.nodes[to].backlinks.insert(from);
        true
    }

    pub fn has_link(&self, from: usize, to: usize) -> bool {
        self.nodes
            .get(from)
            .map(|node| node.forelinks.contains(&to))
            .unwrap_or(false)
    }

    /// Total number of forelinks in the graph
    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(|node| node.forelinks.len()).sum()
    }

    /// Identifiers of every node, in order
    pub fn identifiers(&self) -> Vec<Option<&str>> {
        self.nodes
            .iter()
            .map(|node| node.identifier.as_deref())
            .collect()
    }

    /// Attach identifiers to the nodes; returns `false` on a length mismatch
    pub fn set_identifiers<I, S>(&mut self, identifiers: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identifiers: Vec<String> = identifiers.into_iter().map(Into::into).collect();
        if identifiers.len() != self.nodes.len() {
            tracing::warn!(
                "Identifier list has {} entries for {} nodes",
                identifiers.len(),
                self.nodes.len()
            );
            return false;
        }
        for (node, identifier) in self.nodes.iter_mut().zip(identifiers) {
            node.identifier = Some(identifier);
        }
        true
    }

    /// Extract the sublinkograph on nodes `[lower, upper]`, re-indexed from 0
    ///
    /// Missing bounds default to the extremes and bounds are clamped into the
    /// graph. Links leaving the range are dropped. An empty range yields a
    /// linkograph with no nodes that keeps the vocabulary.
    pub fn subgraph(&self, lower: Option<usize>, upper: Option<usize>) -> Linkograph {
        let mut sub = Linkograph {
            vocabulary: self.vocabulary.clone(),
            nodes: Vec::new(),
        };

        if self.nodes.is_empty() {
            return sub;
        }

        let lower = lower.unwrap_or(0);
        let upper = upper.unwrap_or(self.nodes.len() - 1).min(self.nodes.len() - 1);

        if lower > upper {
            return sub;
        }

        sub.nodes = self.nodes[lower..=upper]
            .iter()
            .map(|node| Node {
                labels: node.labels.clone(),
                backlinks: node
                    .backlinks
                    .iter()
                    .filter(|&&b| b >= lower)
                    .map(|b| b - lower)
                    .collect(),
                forelinks: node
                    .forelinks
                    .iter()
                    .filter(|&&f| f <= upper)
                    .map(|f| f - lower)
                    .collect(),
                identifier: node.identifier.clone(),
            })
            .collect();

        sub
    }

    /// Labels that occur on at least one node
    ///
    /// With `in_vocabulary_order` the result only holds vocabulary labels, in
    /// vocabulary order; otherwise every used label is returned (sorted).
    pub fn appearance_list(&self, in_vocabulary_order: bool) -> Vec<String> {
        let used: BTreeSet<&String> = self.nodes.iter().flat_map(|n| n.labels.iter()).collect();

        if in_vocabulary_order {
            self.vocabulary
                .iter()
                .filter(|label| used.contains(label))
                .cloned()
                .collect()
        } else {
            used.into_iter().cloned().collect()
        }
    }

    /// Per-node label assignment inverted into label -> ascending indices
    pub fn inverse_labeling(&self) -> InverseLabeling {
        let mut inverse = InverseLabeling::new();
        for (index, node) in self.nodes.iter().enumerate() {
            for label in &node.labels {
                inverse.entry(label.clone()).or_default().push(index);
            }
        }
        inverse
    }
}

impl<'a> IntoIterator for &'a Linkograph {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Five-node graph used across the statistics tests
    ///
    /// ```text
    /// 0 {A,B,C} -> 1, 2, 3
    /// 1 {D}     -> 3, 4
    /// 2 {A}     -> 4
    /// 3 {B,C}   -> 4
    /// 4 {A}
    /// ```
    pub(crate) fn simple_linko() -> Linkograph {
        let mut linko = Linkograph::new()
            .with_vocabulary(["A", "B", "C", "D"])
            .with_nodes(vec![
                Node::new().with_labels(["A", "B", "C"]),
                Node::new().with_labels(["D"]),
                Node::new().with_labels(["A"]),
                Node::new().with_labels(["B", "C"]),
                Node::new().with_labels(["A"]),
            ]);
        for (from, to) in [(0, 1), (0, 2), (0, 3), (1, 3), (1, 4), (2, 4), (3, 4)] {
            linko.add_link(from, to);
        }
        linko
    }

    #[test]
    fn test_add_link_is_forward_only() {
        let mut linko = Linkograph::with_size(3);
        assert!(linko.add_link(0, 2));
        assert!(!linko.add_link(2, 0));
        assert!(!linko.add_link(1, 1));
        assert!(!linko.add_link(1, 3));

        assert!(linko.has_link(0, 2));
        assert_eq!(linko.nodes[2].backlinks, BTreeSet::from([0]));
        assert_eq!(linko.link_count(), 1);
    }

    #[test]
    fn test_subgraph_reindexes_and_drops_outside_links() {
        let linko = simple_linko();
        let sub = linko.subgraph(Some(1), Some(3));

        assert_eq!(sub.len(), 3);
        assert_eq!(sub.vocabulary, linko.vocabulary);
        // Old node 1: backlink 0 dropped, forelink 3 -> 2, forelink 4 dropped
        assert!(sub.nodes[0].backlinks.is_empty());
        assert_eq!(sub.nodes[0].forelinks, BTreeSet::from([2]));
        // Old node 3: backlinks {0,1} -> {0}
        assert_eq!(sub.nodes[2].backlinks, BTreeSet::from([0]));
        assert!(sub.nodes[2].forelinks.is_empty());
        assert_eq!(sub.nodes[2].labels, BTreeSet::from(["B".to_string(), "C".to_string()]));
    }

    #[test]
    fn test_subgraph_bounds() {
        let linko = simple_linko();

        assert_eq!(linko.subgraph(None, None), linko);
        assert_eq!(linko.subgraph(None, Some(40)), linko);

        let empty = linko.subgraph(Some(3), Some(2));
        assert!(empty.is_empty());
        assert_eq!(empty.vocabulary, linko.vocabulary);

        let past_end = linko.subgraph(Some(9), None);
        assert!(past_end.is_empty());

        assert!(Linkograph::new().subgraph(None, None).is_empty());
    }

    #[test]
    fn test_subgraph_is_independent() {
        let linko = simple_linko();
        let mut sub = linko.subgraph(Some(0), Some(2));
        sub.nodes[0].labels.clear();
        assert_eq!(linko.nodes[0].labels.len(), 3);
    }

    #[test]
    fn test_appearance_list() {
        let mut linko = simple_linko();
        linko.vocabulary.push("E".into());
        linko.nodes[1].labels.insert("Z".into());

        assert_eq!(linko.appearance_list(true), vec!["A", "B", "C", "D"]);
        assert_eq!(linko.appearance_list(false), vec!["A", "B", "C", "D", "Z"]);
    }

    #[test]
    fn test_inverse_labeling() {
        let inverse = simple_linko().inverse_labeling();
        assert_eq!(inverse["A"], vec![0, 2, 4]);
        assert_eq!(inverse["D"], vec![1]);
    }

    #[test]
    fn test_set_identifiers() {
        let mut linko = Linkograph::with_size(2);
        assert!(!linko.set_identifiers(["only-one"]));
        assert!(linko.set_identifiers(["a", "b"]));
        assert_eq!(linko.identifiers(), vec![Some("a"), Some("b")]);
    }
}
