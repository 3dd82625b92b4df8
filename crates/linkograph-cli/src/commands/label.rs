//! Labeling commands

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use super::io::read_text;
use crate::output::{emit, format_output, write_output};
use crate::AppContext;
use linkograph_core::InverseLabeling;
use linkograph_label::{parse_commands, select_commands, Command, Labeler};

#[derive(Args)]
pub struct LabelArgs {
    /// Command session (JSON list of {"cmd", "ts"} objects)
    pub commands: PathBuf,

    /// Label rules (JSON object of label -> patterns)
    pub rules: PathBuf,

    /// Label for unmatched commands (default: from config)
    #[arg(short, long)]
    pub default_label: Option<String>,

    /// Leave unmatched commands unlabeled
    #[arg(long, conflicts_with = "default_label")]
    pub no_default: bool,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Command session (JSON list of {"cmd", "ts"} objects)
    pub commands: PathBuf,

    /// Zero-based command positions
    #[arg(required = true)]
    pub indices: Vec<usize>,

    /// Pair each command with its position
    #[arg(short, long)]
    pub line_numbers: bool,
}

fn labeling_text(labels: &InverseLabeling) -> String {
    labels
        .iter()
        .map(|(label, nodes)| {
            let nodes: Vec<String> = nodes.iter().map(ToString::to_string).collect();
            format!("{}: {}", label, nodes.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_commands(path: &Path) -> anyhow::Result<Vec<Command>> {
    parse_commands(&read_text(path)?)
        .with_context(|| format!("Invalid command session in {}", path.display()))
}

pub fn run_label(args: &LabelArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let commands = read_commands(&args.commands)?;
    let labeler = Labeler::from_json(&read_text(&args.rules)?)?;

    let default_label = match (&args.default_label, args.no_default) {
        (_, true) => None,
        (Some(label), false) => Some(label.as_str()),
        (None, false) => Some(ctx.config.default_label.as_str()),
    };

    tracing::info!(
        "Labeling {} commands with {} rules",
        commands.len(),
        labeler.labels().len()
    );
    let labels = labeler.label_commands(&commands, default_label)?;

    let content = format_output(&labels, ctx.format, labeling_text)?;
    write_output(&content, args.output.as_deref())
}

pub fn run_select(args: &SelectArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let commands = read_commands(&args.commands)?;
    let selected = select_commands(&commands, &args.indices)?;

    if args.line_numbers {
        let pairs: Vec<(usize, &str)> = selected.iter().map(|s| (s.index, s.cmd.as_str())).collect();
        emit(&pairs, ctx.format, |pairs| {
            pairs
                .iter()
                .map(|(index, cmd)| format!("{}: {}", index, cmd))
                .collect::<Vec<_>>()
                .join("\n")
        })
    } else {
        let cmds: Vec<&str> = selected.iter().map(|s| s.cmd.as_str()).collect();
        emit(&cmds, ctx.format, |cmds| cmds.join("\n"))
    }
}
