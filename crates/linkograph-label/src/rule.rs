//! Label rule definitions and rule-set parsing
//!
//! A rule set is a JSON object mapping each label to a list of patterns,
//! optionally led by an integer priority:
//!
//! ```json
//! {
//!     "Navigate": [2, {"command": {"expression": "cd", "type": "exact"}}],
//!     "Install": [1, {"command": {"expression": "apt", "type": "substring"},
//!                     "arguments": {"expression": "install", "type": "regEx"}}]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LabelError, LabelResult};

/// How an expression is compared against a command token or argument string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// Whole-string, case-sensitive equality
    #[serde(rename = "exact")]
    Exact,

    /// Case-sensitive occurrence anywhere in the string
    #[serde(rename = "substring")]
    Substring,

    /// Case-insensitive regular expression anchored at the start
    #[serde(rename = "regEx", alias = "regex")]
    Regex,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Substring => write!(f, "substring"),
            Self::Regex => write!(f, "regEx"),
        }
    }
}

impl FromStr for MatchType {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "substring" => Ok(Self::Substring),
            "regEx" | "regex" => Ok(Self::Regex),
            other => Err(LabelError::definition(format!(
                "Expression type not recognized: '{}'",
                other
            ))),
        }
    }
}

/// One side (command or arguments) of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pattern {
    /// An explicitly empty expression: the side must be absent from the event
    Empty,

    Match {
        expression: String,
        match_type: MatchType,
    },
}

impl Pattern {
    pub fn exact(expression: impl Into<String>) -> Self {
        Self::Match {
            expression: expression.into(),
            match_type: MatchType::Exact,
        }
    }

    pub fn substring(expression: impl Into<String>) -> Self {
        Self::Match {
            expression: expression.into(),
            match_type: MatchType::Substring,
        }
    }

    pub fn regex(expression: impl Into<String>) -> Self {
        Self::Match {
            expression: expression.into(),
            match_type: MatchType::Regex,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A pattern record attached to a label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelRule {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Pattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Pattern>,
}

impl LabelRule {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: None,
            arguments: None,
        }
    }

    pub fn with_command(mut self, pattern: Pattern) -> Self {
        self.command = Some(pattern);
        self
    }

    pub fn with_arguments(mut self, pattern: Pattern) -> Self {
        self.arguments = Some(pattern);
        self
    }

    /// Reject rules that can never match or that match on arguments alone
    pub fn validate(&self) -> LabelResult<()> {
        let is_match = |side: &Option<Pattern>| matches!(side, Some(Pattern::Match { .. }));

        if !is_match(&self.command) && !is_match(&self.arguments) {
            return Err(LabelError::definition(format!(
                "Found empty label: '{}'",
                self.label
            )));
        }
        if matches!(self.command, Some(Pattern::Empty)) && is_match(&self.arguments) {
            return Err(LabelError::definition(format!(
                "Cannot have strict argument matching: '{}'",
                self.label
            )));
        }
        Ok(())
    }
}

/// Parsed rules plus per-label priorities (None when any label lacks one)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub rules: Vec<LabelRule>,
    pub priorities: Option<BTreeMap<String, i64>>,
}

impl RuleSet {
    pub fn from_json(text: &str) -> LabelResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> LabelResult<Self> {
        let labels = value
            .as_object()
            .ok_or_else(|| LabelError::definition("Label object is not a map"))?;

        let mut rules = Vec::new();
        let mut priorities = BTreeMap::new();
        let mut prioritized = true;

        for (label, entries) in labels {
            let entries = entries.as_array().ok_or_else(|| {
                LabelError::definition(format!("Label '{}' is not a list of patterns", label))
            })?;
            if entries.is_empty() {
                return Err(LabelError::definition(format!(
                    "Label '{}' has no patterns",
                    label
                )));
            }

            let patterns = match entries[0].as_i64() {
                Some(priority) => {
                    priorities.insert(label.clone(), priority);
                    &entries[1..]
                }
                None => {
                    prioritized = false;
                    &entries[..]
                }
            };

            for pattern in patterns {
                // Priorities are only read from the head of each list.
                if pattern.is_i64() {
                    continue;
                }
                rules.push(parse_pattern(label, pattern)?);
            }
        }

        if !prioritized && !priorities.is_empty() {
            tracing::warn!(
                "Priorities given for {} of {} labels; priority resolution disabled",
                priorities.len(),
                labels.len()
            );
        }

        Ok(Self {
            rules,
            priorities: prioritized.then_some(priorities),
        })
    }
}

/// Truthiness of a side object as written in the rule file
fn is_present(side: Option<&Value>) -> bool {
    match side {
        None | Some(Value::Null) => false,
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

fn parse_side(label: &str, side: Option<&Value>) -> LabelResult<Option<Pattern>> {
    let side = match side {
        None | Some(Value::Null) => return Ok(None),
        Some(side) => side,
    };
    let side: &Map<String, Value> = side.as_object().ok_or_else(|| {
        LabelError::definition(format!("Invalid pattern for label '{}'", label))
    })?;

    let expression = side
        .get("expression")
        .and_then(Value::as_str)
        .ok_or_else(|| LabelError::definition(format!("Invalid expression for label '{}'", label)))?;

    if expression.is_empty() {
        return Ok(Some(Pattern::Empty));
    }

    let match_type = side
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            LabelError::definition(format!("Missing expression type for label '{}'", label))
        })?
        .parse()?;

    Ok(Some(Pattern::Match {
        expression: expression.to_string(),
        match_type,
    }))
}

fn parse_pattern(label: &str, pattern: &Value) -> LabelResult<LabelRule> {
    let object = pattern.as_object().ok_or_else(|| {
        LabelError::definition(format!("Invalid pattern for label '{}'", label))
    })?;

    let command = object.get("command");
    let arguments = object.get("arguments");
    if !is_present(command) && !is_present(arguments) {
        return Err(LabelError::definition(format!(
            "Found empty label: '{}'",
            label
        )));
    }

    let rule = LabelRule {
        label: label.to_string(),
        command: parse_side(label, command)?,
        arguments: parse_side(label, arguments)?,
    };
    rule.validate()?;
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition_error(value: Value) -> String {
        match RuleSet::from_value(&value) {
            Err(LabelError::InvalidLabelDefinition(message)) => message,
            other => panic!("expected a definition error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_with_priorities() {
        let rules = RuleSet::from_value(&json!({
            "A": [2, {"command": {"expression": "cd", "type": "exact"}}],
            "B": [1, {"command": {"expression": "ls", "type": "regEx"},
                      "arguments": {"expression": "", "type": "exact"}}]
        }))
        .unwrap();

        assert_eq!(rules.rules.len(), 2);
        assert_eq!(rules.rules[0], LabelRule::new("A").with_command(Pattern::exact("cd")));
        assert_eq!(
            rules.rules[1],
            LabelRule::new("B")
                .with_command(Pattern::regex("ls"))
                .with_arguments(Pattern::Empty)
        );
        let priorities = rules.priorities.unwrap();
        assert_eq!(priorities["A"], 2);
        assert_eq!(priorities["B"], 1);
    }

    #[test]
    fn test_partial_priorities_disable_resolution() {
        let rules = RuleSet::from_value(&json!({
            "A": [2, {"command": {"expression": "cd", "type": "exact"}}],
            "B": [{"command": {"expression": "ls", "type": "exact"}}]
        }))
        .unwrap();
        assert_eq!(rules.rules.len(), 2);
        assert!(rules.priorities.is_none());
    }

    #[test]
    fn test_rejects_empty_rules() {
        let message = definition_error(json!({"A": [{"command": {}}]}));
        assert!(message.contains("empty label"));

        let message = definition_error(json!({"A": [{}]}));
        assert!(message.contains("empty label"));

        let message = definition_error(json!({
            "A": [{"command": {"expression": "", "type": "exact"}}]
        }));
        assert!(message.contains("empty label"));
    }

    #[test]
    fn test_rejects_non_string_expression() {
        let message = definition_error(json!({
            "A": [{"command": {"expression": 4, "type": "exact"}}]
        }));
        assert!(message.contains("Invalid expression"));

        let message = definition_error(json!({
            "A": [{"command": {"expression": "cd", "type": "exact"}, "arguments": {}}]
        }));
        assert!(message.contains("Invalid expression"));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let message = definition_error(json!({
            "A": [{"command": {"expression": "cd", "type": "fuzzy"}}]
        }));
        assert!(message.contains("not recognized"));
    }

    #[test]
    fn test_rejects_strict_argument_matching() {
        let message = definition_error(json!({
            "A": [{"command": {"expression": "", "type": "exact"},
                   "arguments": {"expression": "-la", "type": "exact"}}]
        }));
        assert!(message.contains("strict argument"));
    }

    #[test]
    fn test_argument_only_rule_is_allowed() {
        let rules = RuleSet::from_value(&json!({
            "Secret": [{"arguments": {"expression": "passwd", "type": "substring"}}]
        }))
        .unwrap();
        assert_eq!(rules.rules[0].command, None);
        assert_eq!(rules.rules[0].arguments, Some(Pattern::substring("passwd")));
    }

    #[test]
    fn test_rejects_malformed_shapes() {
        assert!(RuleSet::from_value(&json!([1, 2])).is_err());
        assert!(RuleSet::from_value(&json!({"A": "cd"})).is_err());
        assert!(RuleSet::from_value(&json!({"A": []})).is_err());
        assert!(RuleSet::from_value(&json!({"A": ["cd"]})).is_err());
        assert!(matches!(
            RuleSet::from_json("{"),
            Err(LabelError::Serialization(_))
        ));
    }

    #[test]
    fn test_match_type_names() {
        assert_eq!("regex".parse::<MatchType>().unwrap(), MatchType::Regex);
        assert_eq!(MatchType::Regex.to_string(), "regEx");
        assert!("glob".parse::<MatchType>().is_err());
    }
}
