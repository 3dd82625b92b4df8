//! Expression matchers for one side of an event
//!
//! Each matcher maps the text it is given to the indexes of the rules whose
//! expression it satisfies. Matchers are built once per rule set and are
//! read-only afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::{Regex, RegexBuilder};

use crate::error::LabelResult;
use crate::rule::{LabelRule, MatchType, Pattern};

/// Trait for rule matchers
pub trait Matcher: Send + Sync {
    /// Add the indexes of every rule satisfied by `text` to `matches`
    fn collect(&self, text: &str, matches: &mut BTreeSet<usize>);
}

/// Whole-string, case-sensitive lookup
#[derive(Debug, Default)]
pub struct ExactMatcher {
    table: HashMap<String, BTreeSet<usize>>,
}

impl ExactMatcher {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        let mut table: HashMap<String, BTreeSet<usize>> = HashMap::new();
        for (expression, rule) in entries {
            table.entry(expression.to_string()).or_default().insert(rule);
        }
        Self { table }
    }
}

impl Matcher for ExactMatcher {
    fn collect(&self, text: &str, matches: &mut BTreeSet<usize>) {
        if let Some(rules) = self.table.get(text) {
            matches.extend(rules);
        }
    }
}

/// Case-sensitive occurrence anywhere in the text
///
/// All expressions share one automaton; overlapping occurrences are reported
/// so that an expression contained in another still matches.
#[derive(Debug, Default)]
pub struct SubstringMatcher {
    automaton: Option<AhoCorasick>,
    rules: Vec<BTreeSet<usize>>,
}

impl SubstringMatcher {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, usize)>) -> LabelResult<Self> {
        let mut grouped: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for (expression, rule) in entries {
            grouped.entry(expression).or_default().insert(rule);
        }
        if grouped.is_empty() {
            return Ok(Self::default());
        }

        let patterns: Vec<&str> = grouped.keys().copied().collect();
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(&patterns)?;

        Ok(Self {
            automaton: Some(automaton),
            rules: grouped.into_values().collect(),
        })
    }
}

impl Matcher for SubstringMatcher {
    fn collect(&self, text: &str, matches: &mut BTreeSet<usize>) {
        let Some(automaton) = &self.automaton else {
            return;
        };
        for found in automaton.find_overlapping_iter(text) {
            matches.extend(&self.rules[found.pattern().as_usize()]);
        }
    }
}

/// Case-insensitive regular expressions anchored at the start of the text
#[derive(Debug, Default)]
pub struct RegexMatcher {
    expressions: Vec<(Regex, BTreeSet<usize>)>,
}

impl RegexMatcher {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, usize)>) -> LabelResult<Self> {
        let mut grouped: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for (expression, rule) in entries {
            grouped.entry(expression).or_default().insert(rule);
        }

        let expressions = grouped
            .into_iter()
            .map(|(expression, rules)| {
                let regex = RegexBuilder::new(&format!("^(?:{})", expression))
                    .case_insensitive(true)
                    .build()?;
                Ok((regex, rules))
            })
            .collect::<LabelResult<Vec<_>>>()?;

        Ok(Self { expressions })
    }
}

impl Matcher for RegexMatcher {
    fn collect(&self, text: &str, matches: &mut BTreeSet<usize>) {
        for (regex, rules) in &self.expressions {
            if regex.is_match(text) {
                matches.extend(rules);
            }
        }
    }
}

/// Which part of an event a matcher set reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Command,
    Arguments,
}

impl Side {
    fn pattern(self, rule: &LabelRule) -> Option<&Pattern> {
        match self {
            Self::Command => rule.command.as_ref(),
            Self::Arguments => rule.arguments.as_ref(),
        }
    }
}

/// The three matchers for one side of every rule
pub struct MatcherSet {
    matchers: Vec<Box<dyn Matcher>>,
}

impl MatcherSet {
    /// Index the non-empty expressions on `side` of `rules`
    ///
    /// Rule indexes are positions in `rules`.
    pub fn build(rules: &[LabelRule], side: Side) -> LabelResult<Self> {
        let entries = |kind: MatchType| {
            rules.iter().enumerate().filter_map(move |(index, rule)| {
                match side.pattern(rule) {
                    Some(Pattern::Match {
                        expression,
                        match_type,
                    }) if *match_type == kind => Some((expression.as_str(), index)),
                    _ => None,
                }
            })
        };

        let matchers: Vec<Box<dyn Matcher>> = vec![
            Box::new(ExactMatcher::new(entries(MatchType::Exact))),
            Box::new(SubstringMatcher::new(entries(MatchType::Substring))?),
            Box::new(RegexMatcher::new(entries(MatchType::Regex))?),
        ];
        Ok(Self { matchers })
    }

    pub fn matches(&self, text: &str) -> BTreeSet<usize> {
        let mut matches = BTreeSet::new();
        for matcher in &self.matchers {
            matcher.collect(text, &mut matches);
        }
        matches
    }
}
