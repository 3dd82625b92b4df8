//! Frequency studies over labelings and sub-linkographs

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::counter::ModularCounter;
use crate::builder::build_linkograph;
use crate::error::Result;
use crate::limits::validate_sweep;
use crate::linkograph::{Linkograph, Ontology};

/// How labelings are chosen for a sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyOptions {
    /// Abstraction classes (None = the ontology's keys)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,

    /// Labelings to visit (None = every labeling)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,

    /// Draw labelings at random instead of counting through them
    #[serde(default)]
    pub random: bool,

    /// Seed for random draws
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl FrequencyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn with_samples(mut self, samples: u64) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Random draws, reproducible when `seed` is given
    pub fn randomized(mut self, seed: Option<u64>) -> Self {
        self.random = true;
        self.seed = seed;
        self
    }
}

/// Build the linkograph of each selected labeling and hand it to `visit`
///
/// The first labeling is always the all-zero one. Afterwards the counter is
/// either stepped or re-drawn at random.
fn sweep<V>(length: usize, ontology: &Ontology, options: &FrequencyOptions, mut visit: V) -> Result<()>
where
    V: FnMut(&ModularCounter, &[String], &Linkograph) -> Result<()>,
{
    let classes: Vec<String> = options
        .classes
        .clone()
        .unwrap_or_else(|| ontology.keys().cloned().collect());

    let samples = match options.samples {
        _ if length == 0 => 1,
        Some(samples) => samples,
        None => validate_sweep(classes.len(), length)?,
    };

    tracing::debug!(
        "Sweeping {} labelings of length {} over {} classes (random: {})",
        samples,
        length,
        classes.len(),
        options.random
    );

    let mut counter = ModularCounter::new(length, classes.len(), options.seed);
    for _ in 0..samples {
        let inverse = counter.to_inverse_labeling(&classes)?;
        let linko = build_linkograph(&inverse, ontology);
        visit(&counter, &classes, &linko)?;

        if options.random {
            counter.randomize();
        } else {
            counter.increment();
        }
    }
    Ok(())
}

/// Tally `f` over the linkographs induced by `ontology` on `length` nodes
///
/// A length of 0 has exactly one labeling and yields the empty linkograph.
pub fn frequency<F, K>(
    length: usize,
    ontology: &Ontology,
    mut f: F,
    options: &FrequencyOptions,
) -> Result<BTreeMap<K, usize>>
where
    F: FnMut(&Linkograph) -> K,
    K: Ord,
{
    let mut counts = BTreeMap::new();
    sweep(length, ontology, options, |_, _, linko| {
        *counts.entry(f(linko)).or_insert(0) += 1;
        Ok(())
    })?;
    Ok(counts)
}

/// Group the distinct labelings of `length` nodes by `f` of their linkograph
pub fn histogram<F, K>(
    length: usize,
    ontology: &Ontology,
    mut f: F,
    options: &FrequencyOptions,
) -> Result<BTreeMap<K, BTreeSet<Vec<String>>>>
where
    F: FnMut(&Linkograph) -> K,
    K: Ord,
{
    let mut groups: BTreeMap<K, BTreeSet<Vec<String>>> = BTreeMap::new();
    sweep(length, ontology, options, |counter, classes, linko| {
        let labeling = counter.to_labeling(classes)?;
        groups.entry(f(linko)).or_default().insert(labeling);
        Ok(())
    })?;
    Ok(groups)
}

/// Tally `f` over every `size`-node window of each linkograph
///
/// With `overlap` the window slides by one node; otherwise windows tile the
/// graph. Graphs shorter than `size` contribute nothing.
pub fn sub_linkograph_frequency<F, K>(
    graphs: &[Linkograph],
    size: usize,
    overlap: bool,
    mut f: F,
) -> BTreeMap<K, usize>
where
    F: FnMut(&Linkograph) -> K,
    K: Ord,
{
    let mut counts = BTreeMap::new();
    if size == 0 {
        return counts;
    }

    let stride = if overlap { 1 } else { size };
    for linko in graphs {
        let mut lower = 0;
        while lower + size <= linko.len() {
            let sub = linko.subgraph(Some(lower), Some(lower + size - 1));
            *counts.entry(f(&sub)).or_insert(0) += 1;
            lower += stride;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumeration::{encode, LinkCode};
    use crate::error::Error;
    use crate::linkograph::tests::simple_linko;

    fn a_to_b() -> Ontology {
        Ontology::from([
            ("A".to_string(), vec!["B".to_string()]),
            ("B".to_string(), Vec::new()),
        ])
    }

    fn labeling(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_frequency_exhaustive() {
        let counts = frequency(2, &a_to_b(), |g| g.link_count(), &FrequencyOptions::new()).unwrap();
        assert_eq!(counts, BTreeMap::from([(0, 3), (1, 1)]));

        let counts = frequency(3, &a_to_b(), |g| g.link_count(), &FrequencyOptions::new()).unwrap();
        assert_eq!(counts.values().sum::<usize>(), 8);
        // AAB and ABB both give two links
        assert_eq!(counts[&2], 2);
    }

    #[test]
    fn test_frequency_by_encoding() {
        let counts = frequency(2, &a_to_b(), |g| encode(g).code, &FrequencyOptions::new()).unwrap();
        assert_eq!(counts[&LinkCode::zero()], 3);
        assert_eq!(counts[&LinkCode::from(1u64)], 1);
    }

    #[test]
    fn test_frequency_sampled() {
        let options = FrequencyOptions::new().with_samples(2);
        let counts = frequency(2, &a_to_b(), |g| g.link_count(), &options).unwrap();
        assert_eq!(counts, BTreeMap::from([(0, 2)]));

        let options = FrequencyOptions::new().with_samples(50).randomized(Some(7));
        let first = frequency(4, &a_to_b(), |g| g.link_count(), &options).unwrap();
        let second = frequency(4, &a_to_b(), |g| g.link_count(), &options).unwrap();
        assert_eq!(first.values().sum::<usize>(), 50);
        assert_eq!(first, second);
    }

    #[test]
    fn test_frequency_empty_length() {
        let counts = frequency(0, &a_to_b(), |g| g.len(), &FrequencyOptions::new()).unwrap();
        assert_eq!(counts, BTreeMap::from([(0, 1)]));
    }

    #[test]
    fn test_frequency_class_errors() {
        let options = FrequencyOptions::new().with_classes(Vec::new()).with_samples(1);
        let result = frequency(2, &a_to_b(), |g| g.len(), &options);
        assert!(matches!(result, Err(Error::ClassOutOfRange { .. })));

        let result = frequency(40, &a_to_b(), |g| g.len(), &FrequencyOptions::new());
        assert!(matches!(result, Err(Error::Limit(_))));
    }

    #[test]
    fn test_histogram() {
        let groups = histogram(2, &a_to_b(), |g| g.link_count(), &FrequencyOptions::new()).unwrap();
        assert_eq!(groups[&1], BTreeSet::from([labeling(&["A", "B"])]));
        assert_eq!(
            groups[&0],
            BTreeSet::from([
                labeling(&["A", "A"]),
                labeling(&["B", "A"]),
                labeling(&["B", "B"]),
            ])
        );
    }

    #[test]
    fn test_histogram_with_explicit_classes() {
        let options = FrequencyOptions::new().with_classes(labeling(&["B", "A"]));
        let groups = histogram(2, &a_to_b(), |g| g.link_count(), &options).unwrap();
        assert_eq!(groups[&1], BTreeSet::from([labeling(&["A", "B"])]));
    }

    #[test]
    fn test_sub_linkograph_frequency() {
        let graphs = [simple_linko()];
        let overlapping = sub_linkograph_frequency(&graphs, 2, true, |g| g.link_count());
        assert_eq!(overlapping, BTreeMap::from([(0, 2), (1, 2)]));

        let tiled = sub_linkograph_frequency(&graphs, 2, false, |g| g.link_count());
        assert_eq!(tiled, BTreeMap::from([(0, 1), (1, 1)]));

        assert!(sub_linkograph_frequency(&graphs, 6, true, |g| g.len()).is_empty());
        assert!(sub_linkograph_frequency(&graphs, 0, true, |g| g.len()).is_empty());
    }

    #[test]
    fn test_sub_linkograph_frequency_counts_across_graphs() {
        let graphs = [simple_linko(), simple_linko().subgraph(Some(1), Some(3))];
        let counts = sub_linkograph_frequency(&graphs, 3, true, |g| encode(g).code);
        assert_eq!(counts.values().sum::<usize>(), 4);
    }
}
