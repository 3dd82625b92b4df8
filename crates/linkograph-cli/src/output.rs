//! Output formatting utilities

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => anyhow::bail!("Unknown output format: {} (expected json or text)", other),
        }
    }
}

/// Render `data` as pretty JSON or through `text`
pub fn format_output<T, F>(data: &T, format: OutputFormat, text: F) -> anyhow::Result<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Text => Ok(text(data)),
    }
}

/// Write to `path`, or to stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, ensure_newline(content))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(ensure_newline(content).as_bytes())?;
        }
    }
    Ok(())
}

/// Format and print in one step
pub fn emit<T, F>(data: &T, format: OutputFormat, text: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    write_output(&format_output(data, format, text)?, None)
}

fn ensure_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    }
}

/// Fixed-precision number for text output
pub fn number(value: f64) -> String {
    format!("{:.6}", value)
}

pub fn optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), number)
}
