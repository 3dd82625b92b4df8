//! Command events

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LabelError, LabelResult};

/// One recorded event: a command line and an optional timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub cmd: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl Command {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            ts: None,
        }
    }

    pub fn with_timestamp(mut self, ts: impl Into<String>) -> Self {
        self.ts = Some(ts.into());
        self
    }

    /// Split into the command token and its normalized arguments
    ///
    /// Arguments are the remaining whitespace-separated tokens joined by a
    /// single space; an event with no arguments yields an empty string.
    pub fn split(&self) -> LabelResult<(&str, String)> {
        let mut tokens = self.cmd.split_whitespace();
        let token = tokens
            .next()
            .ok_or_else(|| LabelError::InvalidCommandObject("No command found".to_string()))?;
        let arguments = tokens.collect::<Vec<_>>().join(" ");
        Ok((token, arguments))
    }
}

/// Parse a session: a JSON array of `{"cmd": ..., "ts": ...}` objects
///
/// An entry that is not an object or has no string `cmd` is an
/// [`InvalidCommandObject`](LabelError::InvalidCommandObject).
pub fn parse_commands(text: &str) -> LabelResult<Vec<Command>> {
    let entries: Vec<Value> = serde_json::from_str(text)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.get("cmd").is_some_and(Value::is_string) {
                return Err(LabelError::InvalidCommandObject(format!(
                    "Entry {} has no 'cmd' string",
                    index
                )));
            }
            Ok(serde_json::from_value(entry)?)
        })
        .collect()
}

/// A picked command paired with its position in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCommand {
    pub index: usize,
    pub cmd: String,
}

/// Pick the command strings at `indices`, in the order given
pub fn select_commands(commands: &[Command], indices: &[usize]) -> LabelResult<Vec<SelectedCommand>> {
    indices
        .iter()
        .map(|&index| {
            let command = commands.get(index).ok_or_else(|| {
                LabelError::InvalidCommandObject(format!(
                    "Index {} out of range for {} commands",
                    index,
                    commands.len()
                ))
            })?;
            Ok(SelectedCommand {
                index,
                cmd: command.cmd.clone(),
            })
        })
        .collect()
}
