//! Reading input files

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use linkograph_core::Linkograph;

pub fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse a JSON file into `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = read_text(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Load a linkograph from its JSON form, or from CSV when the file ends in `.csv`
pub fn read_linkograph(path: &Path) -> anyhow::Result<Linkograph> {
    let content = read_text(path)?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let linko = if is_csv {
        Linkograph::from_csv_str(&content)
    } else {
        Linkograph::from_json(&content)
    }
    .with_context(|| format!("Invalid linkograph in {}", path.display()))?;

    tracing::debug!("Loaded linkograph of {} nodes from {:?}", linko.len(), path);
    Ok(linko)
}
