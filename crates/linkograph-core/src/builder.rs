//! Linkograph construction from an inverse labeling and an ontology

use std::collections::{BTreeMap, BTreeSet};

use crate::linkograph::{InverseLabeling, Linkograph, Node, Ontology};

/// Build the linkograph induced by `ontology` over a labeled event sequence
///
/// The graph has one node per index up to the largest index in the labeling;
/// indices that carry no label get an empty label set. For every ontology edge
/// `a -> b`, each `a`-labeled node links forward to every later `b`-labeled
/// node. Ontology labels missing from the labeling are skipped.
pub fn build_linkograph(inverse: &InverseLabeling, ontology: &Ontology) -> Linkograph {
    let size = inverse
        .values()
        .filter_map(|indices| indices.iter().max())
        .max()
        .map_or(0, |max| max + 1);

    tracing::debug!(
        "Building linkograph: nodes={}, labels={}, ontology_edges={}",
        size,
        inverse.len(),
        ontology.values().map(Vec::len).sum::<usize>()
    );

    let vocabulary: BTreeSet<&String> = inverse.keys().chain(ontology.keys()).collect();
    let mut linko = Linkograph {
        vocabulary: vocabulary.into_iter().cloned().collect(),
        nodes: vec![Node::default(); size],
    };

    // The pruned scan below relies on ascending, duplicate-free index lists.
    let sorted: BTreeMap<&String, Vec<usize>> = inverse
        .iter()
        .map(|(label, indices)| {
            let mut indices = indices.clone();
            indices.sort_unstable();
            indices.dedup();
            (label, indices)
        })
        .collect();

    for (label, indices) in &sorted {
        for &index in indices {
            linko.nodes[index].labels.insert((*label).clone());
        }
    }

    for (initial, terminals) in ontology {
        let Some(initial_indices) = sorted.get(initial) else {
            continue;
        };

        for terminal in terminals {
            let Some(terminal_indices) = sorted.get(terminal) else {
                continue;
            };

            for &to in terminal_indices.iter().rev() {
                for &from in initial_indices.iter() {
                    if to <= from {
                        break;
                    }
                    linko.nodes[from].forelinks.insert(to);
                    linko.nodes[to].backlinks.insert(from);
                }
            }
        }
    }

    linko
}
