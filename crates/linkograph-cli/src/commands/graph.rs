//! Linkograph construction and checking commands

use std::path::PathBuf;

use clap::Args;

use super::io::{read_json, read_linkograph};
use crate::output::{write_output, OutputFormat};
use crate::AppContext;
use linkograph_core::{build_linkograph, check_structure, InverseLabeling, Ontology};

#[derive(Args)]
pub struct CreateArgs {
    /// Inverse labeling (JSON object of label -> node indices)
    pub labeling: PathBuf,

    /// Ontology (JSON object of label -> labels it links forward to)
    pub ontology: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Linkograph file (JSON, or CSV with a .csv extension)
    pub linkograph: PathBuf,

    /// Also check that node labels appear in the vocabulary
    #[arg(short, long)]
    pub labels: bool,
}

pub fn run_create(args: &CreateArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let labeling: InverseLabeling = read_json(&args.labeling)?;
    let ontology: Ontology = read_json(&args.ontology)?;

    let linko = build_linkograph(&labeling, &ontology);
    tracing::info!(
        "Created linkograph with {} nodes and {} links",
        linko.len(),
        linko.link_count()
    );

    let content = match ctx.format {
        OutputFormat::Json => linko.to_json_pretty()?,
        OutputFormat::Text => linko.to_csv_string(),
    };
    write_output(&content, args.output.as_deref())
}

/// Print the report; inconsistent graphs exit with an error
pub fn run_check(args: &CheckArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let linko = read_linkograph(&args.linkograph)?;
    let report = check_structure(&linko, args.labels);

    let content = match ctx.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => report.to_string(),
    };
    write_output(&content, None)?;

    if !report.is_consistent() {
        anyhow::bail!(
            "{} has {} structural errors",
            args.linkograph.display(),
            report.error_count()
        );
    }
    Ok(())
}
