//! Linkograph Label - Rule-based labeling of command events
//!
//! Rules match a command token and its arguments by exact text, substring
//! (Aho-Corasick) or anchored regular expression. The resulting inverse
//! labeling feeds [`linkograph_core::build_linkograph`].

pub mod command;
pub mod error;
pub mod labeler;
pub mod matcher;
pub mod rule;

pub use command::{parse_commands, select_commands, Command, SelectedCommand};
pub use error::{LabelError, LabelResult};
pub use labeler::Labeler;
pub use matcher::{ExactMatcher, Matcher, MatcherSet, RegexMatcher, Side, SubstringMatcher};
pub use rule::{LabelRule, MatchType, Pattern, RuleSet};
