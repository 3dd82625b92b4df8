//! Statistics commands

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;

use super::io::read_linkograph;
use crate::output::{emit, number, optional_number};
use crate::AppContext;
use linkograph_core::stats::{
    self, cartesian_statistics, count_critical_nodes, entropy_deviation, graph_entropy,
    link_entropy, link_percentages, link_t_complexity, linkograph_to_bitstring,
    mean_link_coverage, percentage_of_entries, percentage_of_links, similarity,
    subgraph_metric, summary_difference, t_complexity, top_cover, total_labels,
    CartesianStatistics, GraphMetric,
};
use linkograph_core::{LinkDirection, LinkEntropyOptions, NodeValue, SubgraphQuery, Window};

#[derive(Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommands,
}

/// Inclusive node window shared by windowed statistics
#[derive(Args, Clone, Copy)]
pub struct WindowArgs {
    /// First node of the window (clamped into the graph)
    #[arg(long, allow_hyphen_values = true)]
    pub lower: Option<i64>,

    /// Last node of the window (clamped into the graph)
    #[arg(long, allow_hyphen_values = true)]
    pub upper: Option<i64>,
}

impl From<WindowArgs> for Window {
    fn from(args: WindowArgs) -> Self {
        Window {
            lower: args.lower,
            upper: args.upper,
        }
    }
}

/// Neighborhood selection for per-node statistics
#[derive(Args, Clone, Copy)]
pub struct NeighborhoodArgs {
    /// Links considered: back, fore or both
    #[arg(long, default_value = "both")]
    pub direction: LinkDirection,

    /// Largest offset from a node included in its neighborhood
    #[arg(long)]
    pub delta: Option<usize>,

    /// Clip neighborhoods to the window
    #[arg(long)]
    pub restrict: bool,

    /// Pair each value with its node index
    #[arg(short, long)]
    pub line_numbers: bool,

    #[command(flatten)]
    pub window: WindowArgs,
}

impl NeighborhoodArgs {
    fn options(&self) -> LinkEntropyOptions {
        LinkEntropyOptions {
            direction: self.direction,
            delta: self.delta,
            restrict: self.restrict,
            window: self.window.into(),
        }
    }
}

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Fraction of nodes carrying each label
    Entries {
        linkograph: PathBuf,

        /// Report raw counts instead of fractions
        #[arg(long)]
        counts: bool,

        /// Only report these labels
        #[arg(short = 'L', long = "label")]
        labels: Vec<String>,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Link count and link density
    Links {
        linkograph: PathBuf,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Entropy of the links against all possible links
    Entropy {
        linkograph: PathBuf,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Per-node link entropy
    LinkEntropy {
        linkograph: PathBuf,

        #[command(flatten)]
        neighborhood: NeighborhoodArgs,
    },
    /// Per-node fraction of possible links present
    LinkPercentages {
        linkograph: PathBuf,

        #[command(flatten)]
        neighborhood: NeighborhoodArgs,
    },
    /// T-complexity of the whole graph, or of each node with --per-node
    TComplexity {
        linkograph: PathBuf,

        /// Compute per node over its neighborhood
        #[arg(long)]
        per_node: bool,

        /// Subtract the log2 lower bound (per node)
        #[arg(long, requires = "per_node")]
        difference: bool,

        /// Divide by the log2 lower bound (per node)
        #[arg(long, requires = "per_node")]
        normalize: bool,

        #[command(flatten)]
        neighborhood: NeighborhoodArgs,
    },
    /// Sub-ranges whose metric falls within thresholds
    Subgraph {
        linkograph: PathBuf,

        /// Metric: links, percentage-of-links, graph-entropy
        #[arg(long, default_value = "percentage-of-links")]
        metric: GraphMetric,

        #[arg(long, default_value_t = 2)]
        min_size: usize,

        #[arg(long)]
        max_size: Option<usize>,

        #[arg(long, default_value_t = 1)]
        step: usize,

        #[arg(long)]
        lower_threshold: Option<f64>,

        #[arg(long)]
        upper_threshold: Option<f64>,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Compare the links of two linkographs of equal size
    Similarity { first: PathBuf, second: PathBuf },
    /// Shape summaries: link spans, coverage, critical nodes
    Shape {
        linkograph: PathBuf,

        /// Nodes with more links than this are critical
        #[arg(long, default_value_t = 2)]
        critical_threshold: usize,
    },
}

pub fn run(args: &StatsArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        StatsCommands::Entries {
            linkograph,
            counts,
            labels,
            window,
        } => run_entries(linkograph, *counts, labels, (*window).into(), ctx),
        StatsCommands::Links { linkograph, window } => run_links(linkograph, (*window).into(), ctx),
        StatsCommands::Entropy { linkograph, window } => {
            let linko = read_linkograph(linkograph)?;
            let entropy = graph_entropy(&linko, (*window).into());
            emit(&entropy, ctx.format, |e| number(*e))
        }
        StatsCommands::LinkEntropy {
            linkograph,
            neighborhood,
        } => {
            let linko = read_linkograph(linkograph)?;
            let values = link_entropy(&linko, &neighborhood.options());
            emit_node_values(&values, neighborhood.line_numbers, ctx)
        }
        StatsCommands::LinkPercentages {
            linkograph,
            neighborhood,
        } => {
            let linko = read_linkograph(linkograph)?;
            let values = link_percentages(&linko, &neighborhood.options());
            emit_node_values(&values, neighborhood.line_numbers, ctx)
        }
        StatsCommands::TComplexity {
            linkograph,
            per_node,
            difference,
            normalize,
            neighborhood,
        } => {
            let linko = read_linkograph(linkograph)?;
            if *per_node {
                let values =
                    link_t_complexity(&linko, &neighborhood.options(), *difference, *normalize);
                emit_node_values(&values, neighborhood.line_numbers, ctx)
            } else {
                let complexity = t_complexity(&linkograph_to_bitstring(&linko));
                emit(&complexity, ctx.format, |c| number(*c))
            }
        }
        StatsCommands::Subgraph {
            linkograph,
            metric,
            min_size,
            max_size,
            step,
            lower_threshold,
            upper_threshold,
            window,
        } => {
            let linko = read_linkograph(linkograph)?;
            let query = SubgraphQuery::new()
                .with_sizes(*min_size, *max_size)
                .with_step(*step)
                .with_thresholds(*lower_threshold, *upper_threshold)
                .within((*window).into());
            let found = subgraph_metric(&linko, &query, |g, w| metric.evaluate(g, w));
            emit(&found, ctx.format, |found| {
                found
                    .iter()
                    .map(|v| format!("[{}, {}]: {}", v.lower, v.upper, number(v.value)))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        StatsCommands::Similarity { first, second } => {
            let first = read_linkograph(first)?;
            let second = read_linkograph(second)?;
            let result = similarity(&first, &second)?;
            emit(&result, ctx.format, |s| {
                format!(
                    "underlinks: {}\noverlinks: {}\naccuracy: {}",
                    s.underlinks,
                    s.overlinks,
                    number(s.accuracy)
                )
            })
        }
        StatsCommands::Shape {
            linkograph,
            critical_threshold,
        } => run_shape(linkograph, *critical_threshold, ctx),
    }
}

fn run_entries(
    path: &Path,
    counts: bool,
    labels: &[String],
    window: Window,
    ctx: &AppContext,
) -> anyhow::Result<()> {
    let linko = read_linkograph(path)?;
    let keep = |label: &String| labels.is_empty() || labels.contains(label);

    if counts {
        let counts: BTreeMap<String, usize> = total_labels(&linko, window)
            .into_iter()
            .filter(|(label, _)| keep(label))
            .collect();
        emit(&counts, ctx.format, |counts| {
            counts
                .iter()
                .map(|(label, count)| format!("{}: {}", label, count))
                .collect::<Vec<_>>()
                .join("\n")
        })
    } else {
        let fractions: BTreeMap<String, f64> = percentage_of_entries(&linko, window)
            .into_iter()
            .filter(|(label, _)| keep(label))
            .collect();
        emit(&fractions, ctx.format, |fractions| {
            fractions
                .iter()
                .map(|(label, fraction)| format!("{}: {}", label, number(*fraction)))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

#[derive(Serialize)]
struct LinkSummary {
    links: usize,
    percentage: Option<f64>,
}

fn run_links(path: &Path, window: Window, ctx: &AppContext) -> anyhow::Result<()> {
    let linko = read_linkograph(path)?;
    let summary = LinkSummary {
        links: stats::links(&linko, window),
        percentage: percentage_of_links(&linko, window),
    };
    emit(&summary, ctx.format, |s| {
        format!(
            "links: {}\npercentage: {}",
            s.links,
            optional_number(s.percentage)
        )
    })
}

#[derive(Serialize)]
struct ShapeSummary {
    summary_difference: Option<f64>,
    top_cover: Option<f64>,
    mean_link_coverage: Option<f64>,
    entropy_deviation: Option<f64>,
    critical_nodes: usize,
    cartesian: Option<CartesianStatistics>,
}

fn run_shape(path: &Path, critical_threshold: usize, ctx: &AppContext) -> anyhow::Result<()> {
    let linko = read_linkograph(path)?;
    let shape = ShapeSummary {
        summary_difference: summary_difference(&linko),
        top_cover: top_cover(&linko),
        mean_link_coverage: mean_link_coverage(&linko),
        entropy_deviation: entropy_deviation(&linko),
        critical_nodes: count_critical_nodes(&linko, critical_threshold),
        cartesian: cartesian_statistics(&linko),
    };
    emit(&shape, ctx.format, |s| {
        let mut lines = vec![
            format!("summary difference: {}", optional_number(s.summary_difference)),
            format!("top cover: {}", optional_number(s.top_cover)),
            format!("mean link coverage: {}", optional_number(s.mean_link_coverage)),
            format!("entropy deviation: {}", optional_number(s.entropy_deviation)),
            format!("critical nodes: {}", s.critical_nodes),
        ];
        if let Some(c) = &s.cartesian {
            lines.push(format!(
                "x: mean {}, sum {}, range {}",
                number(c.x_mean),
                number(c.x_sum),
                number(c.x_range)
            ));
            lines.push(format!(
                "y: mean {}, sum {}, range {}",
                number(c.y_mean),
                number(c.y_sum),
                number(c.y_range)
            ));
        }
        lines.join("\n")
    })
}

fn emit_node_values(values: &[NodeValue], line_numbers: bool, ctx: &AppContext) -> anyhow::Result<()> {
    if line_numbers {
        emit(values, ctx.format, |values| {
            values
                .iter()
                .map(|v| format!("{}: {}", v.index, number(v.value)))
                .collect::<Vec<_>>()
                .join("\n")
        })
    } else {
        let plain = stats::values(values);
        emit(&plain, ctx.format, |plain| {
            plain.iter().map(|v| number(*v)).collect::<Vec<_>>().join("\n")
        })
    }
}
