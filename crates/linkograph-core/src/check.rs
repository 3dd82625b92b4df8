//! Structural consistency checking

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::linkograph::Linkograph;

/// Asymmetries recorded against a single node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeErrors {
    /// `b` here means `b -> node` is a forelink of `b` but `b` is not a backlink of `node`
    pub missing_backlinks: BTreeSet<usize>,

    /// `f` here means `node <- f` is a backlink of `f` but `f` is not a forelink of `node`
    pub missing_forelinks: BTreeSet<usize>,
}

/// Every violation found by [`check_structure`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    /// Asymmetries keyed by the node whose link set is incomplete
    pub nodes: BTreeMap<usize, NodeErrors>,

    /// Referenced nodes that do not exist
    pub missing_nodes: BTreeSet<usize>,

    /// Links `(from, to)` that do not point strictly forward
    pub misordered: BTreeSet<(usize, usize)>,

    /// Labels used on nodes but absent from the vocabulary
    pub unrecorded_labels: BTreeSet<String>,
}

impl StructureReport {
    pub fn is_consistent(&self) -> bool {
        self.nodes.is_empty()
            && self.missing_nodes.is_empty()
            && self.misordered.is_empty()
            && self.unrecorded_labels.is_empty()
    }

    /// Number of individual violations
    pub fn error_count(&self) -> usize {
        self.nodes
            .values()
            .map(|e| e.missing_backlinks.len() + e.missing_forelinks.len())
            .sum::<usize>()
            + self.missing_nodes.len()
            + self.misordered.len()
            + self.unrecorded_labels.len()
    }
}

fn format_set<T: fmt::Display>(set: &BTreeSet<T>) -> String {
    if set.is_empty() {
        return "None".to_string();
    }
    let items: Vec<String> = set.iter().map(ToString::to_string).collect();
    format!("{{{}}}", items.join(", "))
}

impl fmt::Display for StructureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_consistent() {
            return writeln!(f, "No errors found");
        }
        writeln!(f, "Errors found.")?;
        if !self.missing_nodes.is_empty() {
            writeln!(f, "Missing nodes: {}", format_set(&self.missing_nodes))?;
        }
        if !self.unrecorded_labels.is_empty() {
            writeln!(f, "Labels not recorded: {}", format_set(&self.unrecorded_labels))?;
        }
        for (from, to) in &self.misordered {
            writeln!(f, "Link {} -> {} does not point forward", from, to)?;
        }
        for (node, errors) in &self.nodes {
            writeln!(
                f,
                "Node {}: missing backlinks {}, missing forelinks {}",
                node,
                format_set(&errors.missing_backlinks),
                format_set(&errors.missing_forelinks)
            )?;
        }
        Ok(())
    }
}

/// Check that backlinks and forelinks mirror each other
///
/// Never fails: every violation is accumulated into the report. With
/// `check_labels`, node labels missing from the vocabulary are collected too.
pub fn check_structure(linko: &Linkograph, check_labels: bool) -> StructureReport {
    let mut report = StructureReport::default();
    let size = linko.len();
    let vocabulary: BTreeSet<&str> = linko.vocabulary.iter().map(String::as_str).collect();

    for (index, node) in linko.iter().enumerate() {
        for &back in &node.backlinks {
            if back >= index {
                report.misordered.insert((back, index));
            }
            if back >= size {
                report.missing_nodes.insert(back);
            } else if !linko.nodes[back].forelinks.contains(&index) {
                report
                    .nodes
                    .entry(back)
                    .or_default()
                    .missing_forelinks
                    .insert(index);
            }
        }

        for &fore in &node.forelinks {
            if fore <= index {
                report.misordered.insert((index, fore));
            }
            if fore >= size {
                report.missing_nodes.insert(fore);
            } else if !linko.nodes[fore].backlinks.contains(&index) {
                report
                    .nodes
                    .entry(fore)
                    .or_default()
                    .missing_backlinks
                    .insert(index);
            }
        }

        if check_labels {
            report.unrecorded_labels.extend(
                node.labels
                    .iter()
                    .filter(|label| !vocabulary.contains(label.as_str()))
                    .cloned(),
            );
        }
    }

    if !report.is_consistent() {
        tracing::debug!("Structure check found {} violations", report.error_count());
    }

    report
}
