//! Rule-based labeling of command events

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use linkograph_core::InverseLabeling;
use serde_json::Value;

use crate::command::Command;
use crate::error::LabelResult;
use crate::matcher::{MatcherSet, Side};
use crate::rule::{LabelRule, Pattern, RuleSet};

/// Labels events by matching their command token and arguments against rules
///
/// Built once from a rule set and immutable afterwards, so one labeler can
/// label any number of sessions.
pub struct Labeler {
    rules: Vec<LabelRule>,
    priorities: Option<BTreeMap<String, i64>>,
    commands: MatcherSet,
    arguments: MatcherSet,
}

impl Labeler {
    /// Build from validated rules
    ///
    /// Identical rules are kept once. `priorities` must name every label for
    /// priority resolution to apply.
    pub fn new(rules: Vec<LabelRule>, priorities: Option<BTreeMap<String, i64>>) -> LabelResult<Self> {
        let mut unique: Vec<LabelRule> = Vec::with_capacity(rules.len());
        for rule in rules {
            rule.validate()?;
            if !unique.contains(&rule) {
                unique.push(rule);
            }
        }

        let commands = MatcherSet::build(&unique, Side::Command)?;
        let arguments = MatcherSet::build(&unique, Side::Arguments)?;

        tracing::debug!(
            "Built labeler with {} rules (priorities: {})",
            unique.len(),
            priorities.is_some()
        );

        Ok(Self {
            rules: unique,
            priorities,
            commands,
            arguments,
        })
    }

    pub fn from_rule_set(set: RuleSet) -> LabelResult<Self> {
        Self::new(set.rules, set.priorities)
    }

    pub fn from_value(value: &Value) -> LabelResult<Self> {
        Self::from_rule_set(RuleSet::from_value(value)?)
    }

    pub fn from_json(text: &str) -> LabelResult<Self> {
        Self::from_rule_set(RuleSet::from_json(text)?)
    }

    /// Distinct rules in definition order
    pub fn labels(&self) -> &[LabelRule] {
        &self.rules
    }

    pub fn has_priorities(&self) -> bool {
        self.priorities.is_some()
    }

    pub fn priorities(&self) -> Option<&BTreeMap<String, i64>> {
        self.priorities.as_ref()
    }

    /// Label each command by its position in `commands`
    ///
    /// Commands no rule matches get `default_label` when one is given (an
    /// empty string counts as none). Any malformed command fails the whole
    /// call.
    pub fn label_commands(
        &self,
        commands: &[Command],
        default_label: Option<&str>,
    ) -> LabelResult<InverseLabeling> {
        let default_label = default_label.filter(|label| !label.is_empty());
        let mut labeled: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

        for (position, command) in commands.iter().enumerate() {
            let (token, arguments) = command.split()?;
            let matched = self.match_event(token, &arguments);

            if matched.is_empty() {
                if let Some(label) = default_label {
                    labeled.entry(label.to_string()).or_default().insert(position);
                }
                continue;
            }
            for rule in matched {
                labeled
                    .entry(self.rules[rule].label.clone())
                    .or_default()
                    .insert(position);
            }
        }

        let labeled = match &self.priorities {
            Some(priorities) => resolve_priorities(labeled, priorities),
            None => labeled,
        };

        Ok(labeled
            .into_iter()
            .map(|(label, nodes)| (label, nodes.into_iter().collect()))
            .collect())
    }

    /// Indexes of the rules an event satisfies
    fn match_event(&self, token: &str, arguments: &str) -> BTreeSet<usize> {
        let command_matches = self.commands.matches(token);

        if arguments.is_empty() {
            // Without arguments only rules that leave the argument side open
            // or require it to be empty apply.
            return command_matches
                .into_iter()
                .filter(|&rule| {
                    matches!(self.rules[rule].arguments, None | Some(Pattern::Empty))
                })
                .collect();
        }

        let argument_matches = self.arguments.matches(arguments);
        let mut matched: BTreeSet<usize> = command_matches
            .intersection(&argument_matches)
            .copied()
            .collect();

        // One-sided matches count only for rules that define a single side.
        matched.extend(
            command_matches
                .symmetric_difference(&argument_matches)
                .copied()
                .filter(|&rule| {
                    let rule = &self.rules[rule];
                    rule.command.is_none() || rule.arguments.is_none()
                }),
        );
        matched
    }
}

/// Give each node to the highest-priority label that matched it
///
/// Labels are visited by descending priority, ties by name; a label keeps only
/// the nodes no earlier label claimed, and stays in the result even if that
/// leaves it empty. Labels without a priority (the default label) rank at 0.
fn resolve_priorities(
    labeled: BTreeMap<String, BTreeSet<usize>>,
    priorities: &BTreeMap<String, i64>,
) -> BTreeMap<String, BTreeSet<usize>> {
    let mut ranked: Vec<(String, BTreeSet<usize>)> = labeled.into_iter().collect();
    ranked.sort_by_key(|(label, _)| Reverse(priorities.get(label).copied().unwrap_or(0)));

    let mut claimed = BTreeSet::new();
    let mut resolved = BTreeMap::new();
    for (label, nodes) in ranked {
        let kept: BTreeSet<usize> = nodes.difference(&claimed).copied().collect();
        claimed.extend(&kept);
        resolved.insert(label, kept);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LabelError;
    use serde_json::json;

    fn commands(lines: &[&str]) -> Vec<Command> {
        lines.iter().map(|line| Command::new(*line)).collect()
    }

    fn labeling(pairs: &[(&str, &[usize])]) -> InverseLabeling {
        pairs
            .iter()
            .map(|(label, nodes)| (label.to_string(), nodes.to_vec()))
            .collect()
    }

    #[test]
    fn test_command_only_rule_ignores_arguments() {
        let labeler = Labeler::from_value(&json!({
            "List": [{"command": {"expression": "ls", "type": "exact"}}]
        }))
        .unwrap();

        let result = labeler
            .label_commands(&commands(&["ls", "ls -la", "cd /"]), None)
            .unwrap();
        assert_eq!(result, labeling(&[("List", &[0, 1])]));
    }

    #[test]
    fn test_empty_argument_pattern_is_strict() {
        let labeler = Labeler::from_value(&json!({
            "BareList": [{"command": {"expression": "ls", "type": "exact"},
                          "arguments": {"expression": "", "type": "exact"}}]
        }))
        .unwrap();

        let result = labeler
            .label_commands(&commands(&["ls", "ls -la", "  ls  "]), None)
            .unwrap();
        assert_eq!(result, labeling(&[("BareList", &[0, 2])]));
    }

    #[test]
    fn test_two_sided_rule_needs_both_sides() {
        let labeler = Labeler::from_value(&json!({
            "Install": [{"command": {"expression": "apt", "type": "substring"},
                         "arguments": {"expression": "install", "type": "regEx"}}]
        }))
        .unwrap();

        let result = labeler
            .label_commands(
                &commands(&["apt-get install vim", "apt remove vim", "apt", "pip install x"]),
                None,
            )
            .unwrap();
        assert_eq!(result, labeling(&[("Install", &[0])]));
    }

    #[test]
    fn test_argument_only_rule() {
        let labeler = Labeler::from_value(&json!({
            "Secret": [{"arguments": {"expression": "passwd", "type": "substring"}}]
        }))
        .unwrap();

        let result = labeler
            .label_commands(&commands(&["cat /etc/passwd", "passwd"]), None)
            .unwrap();
        assert_eq!(result, labeling(&[("Secret", &[0])]));
    }

    #[test]
    fn test_arguments_are_normalized_before_matching() {
        let labeler = Labeler::from_value(&json!({
            "Commit": [{"command": {"expression": "git", "type": "exact"},
                        "arguments": {"expression": "commit -m", "type": "exact"}}]
        }))
        .unwrap();

        let result = labeler
            .label_commands(&commands(&["git   commit    -m", "git commit"]), None)
            .unwrap();
        assert_eq!(result, labeling(&[("Commit", &[0])]));
    }

    #[test]
    fn test_multiple_labels_without_priorities() {
        let labeler = Labeler::from_value(&json!({
            "A": [{"command": {"expression": "git", "type": "exact"}}],
            "B": [{"command": {"expression": "GI", "type": "regEx"}}]
        }))
        .unwrap();
        assert!(!labeler.has_priorities());

        let result = labeler.label_commands(&commands(&["git", "gist"]), None).unwrap();
        assert_eq!(result, labeling(&[("A", &[0]), ("B", &[0, 1])]));
    }

    #[test]
    fn test_default_label() {
        let labeler = Labeler::from_value(&json!({
            "A": [{"command": {"expression": "cd", "type": "exact"}}]
        }))
        .unwrap();
        let events = commands(&["cd", "vim", "make"]);

        let result = labeler.label_commands(&events, Some("Other")).unwrap();
        assert_eq!(result, labeling(&[("A", &[0]), ("Other", &[1, 2])]));

        let result = labeler.label_commands(&events, Some("")).unwrap();
        assert_eq!(result, labeling(&[("A", &[0])]));
    }

    #[test]
    fn test_priority_resolution() {
        let labeler = Labeler::from_value(&json!({
            "A": [2, {"command": {"expression": "x", "type": "exact"}}],
            "B": [1, {"command": {"expression": "x", "type": "exact"},
                      "arguments": {"expression": "y", "type": "exact"}}]
        }))
        .unwrap();
        assert!(labeler.has_priorities());

        let result = labeler.label_commands(&commands(&["x", "x y"]), None).unwrap();
        assert_eq!(result, labeling(&[("A", &[0, 1]), ("B", &[])]));
    }

    #[test]
    fn test_priority_resolution_splits_nodes() {
        let labeler = Labeler::from_value(&json!({
            "Low": [1, {"command": {"expression": "g", "type": "substring"}}],
            "High": [5, {"command": {"expression": "git", "type": "exact"}}]
        }))
        .unwrap();

        let result = labeler
            .label_commands(&commands(&["git", "grep", "ls"]), Some("None"))
            .unwrap();
        assert_eq!(
            result,
            labeling(&[("High", &[0]), ("Low", &[1]), ("None", &[2])])
        );
    }

    #[test]
    fn test_priority_ties_break_by_label() {
        let labeler = Labeler::from_value(&json!({
            "B": [3, {"command": {"expression": "x", "type": "exact"}}],
            "A": [3, {"command": {"expression": "x", "type": "exact"}}]
        }))
        .unwrap();

        let result = labeler.label_commands(&commands(&["x"]), None).unwrap();
        assert_eq!(result, labeling(&[("A", &[0]), ("B", &[])]));
    }

    #[test]
    fn test_partial_priorities_keep_all_labels() {
        let labeler = Labeler::from_value(&json!({
            "A": [2, {"command": {"expression": "x", "type": "exact"}}],
            "B": [{"command": {"expression": "x", "type": "exact"}}]
        }))
        .unwrap();
        assert!(!labeler.has_priorities());

        let result = labeler.label_commands(&commands(&["x"]), None).unwrap();
        assert_eq!(result, labeling(&[("A", &[0]), ("B", &[0])]));
    }

    #[test]
    fn test_duplicate_rules_are_merged() {
        let rule = LabelRule::new("A").with_command(Pattern::exact("ls"));
        let labeler = Labeler::new(vec![rule.clone(), rule], None).unwrap();
        assert_eq!(labeler.labels().len(), 1);
    }

    #[test]
    fn test_invalid_rules_fail_construction() {
        let result = Labeler::new(vec![LabelRule::new("A")], None);
        assert!(matches!(result, Err(LabelError::InvalidLabelDefinition(_))));

        let result = Labeler::from_value(&json!({
            "A": [{"command": {"expression": "[", "type": "regEx"}}]
        }));
        assert!(matches!(result, Err(LabelError::Regex(_))));
    }

    #[test]
    fn test_blank_command_aborts_labeling() {
        let labeler = Labeler::from_value(&json!({
            "A": [{"command": {"expression": "ls", "type": "exact"}}]
        }))
        .unwrap();

        let result = labeler.label_commands(&commands(&["ls", "   "]), Some("Other"));
        assert!(matches!(result, Err(LabelError::InvalidCommandObject(_))));
    }

    #[test]
    fn test_empty_session() {
        let labeler = Labeler::from_value(&json!({
            "A": [{"command": {"expression": "ls", "type": "exact"}}]
        }))
        .unwrap();
        assert!(labeler.label_commands(&[], Some("Other")).unwrap().is_empty());
    }
}
