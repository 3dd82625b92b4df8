//! Enumeration commands

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use super::io::{read_json, read_linkograph};
use crate::output::{emit, write_output, OutputFormat};
use crate::AppContext;
use linkograph_core::stats::percentage_of_links;
use linkograph_core::{
    decode, decode_range, encode, frequency, histogram, ontology_from_codes,
    sub_linkograph_frequency, Enumeration, FrequencyOptions, LinkCode, Linkograph, Ontology,
    Window,
};

#[derive(Args)]
pub struct EnumArgs {
    #[command(subcommand)]
    pub command: EnumCommands,
}

#[derive(Args)]
pub struct OntologyArgs {
    /// One adjacency code per class; bit j of code i links class i to class j
    #[arg(required = true)]
    pub codes: Vec<LinkCode>,

    /// Class names (default: 0, 1, ...)
    #[arg(long, value_delimiter = ',')]
    pub classes: Option<Vec<String>>,
}

/// Property of a linkograph tallied by a frequency sweep
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FrequencyKey {
    /// Number of links
    Links,
    /// Topology code
    Code,
    /// Link density, to three decimals
    Density,
}

impl FrequencyKey {
    fn key(self, linko: &Linkograph) -> String {
        match self {
            Self::Links => linko.link_count().to_string(),
            Self::Code => encode(linko).code.to_string(),
            Self::Density => percentage_of_links(linko, Window::full())
                .map_or_else(|| "undefined".to_string(), |d| format!("{:.3}", d)),
        }
    }
}

#[derive(Subcommand)]
pub enum EnumCommands {
    /// Encode linkographs as (length, code) pairs
    Encode {
        #[arg(required = true)]
        linkographs: Vec<PathBuf>,
    },
    /// Rebuild the unlabeled linkograph of a code
    Decode { length: usize, code: LinkCode },
    /// Decode every code in [start, end)
    Range { length: usize, start: u128, end: u128 },
    /// Tally linkographs induced by an ontology over labelings of a length
    Frequency {
        length: usize,

        /// Ontology file (JSON object of label -> labels)
        ontology: PathBuf,

        /// Property to tally
        #[arg(long, value_enum, default_value = "links")]
        by: FrequencyKey,

        /// Classes to label with (default: the ontology's labels)
        #[arg(long, value_delimiter = ',')]
        classes: Option<Vec<String>>,

        /// Labelings to visit (default: config, else all)
        #[arg(long)]
        samples: Option<u64>,

        /// Draw labelings at random
        #[arg(long)]
        random: bool,

        /// Seed for random draws (default: config)
        #[arg(long, requires = "random")]
        seed: Option<u64>,

        /// Group labelings by value instead of counting them
        #[arg(long)]
        histogram: bool,
    },
    /// Tally topology codes of fixed-size windows across linkographs
    Windows {
        #[arg(required = true)]
        linkographs: Vec<PathBuf>,

        /// Window size in nodes
        #[arg(long)]
        size: usize,

        /// Slide windows by one node instead of tiling
        #[arg(long)]
        overlap: bool,
    },
}

#[derive(Serialize)]
struct Tally {
    value: String,
    count: usize,
}

#[derive(Serialize)]
struct Group {
    value: String,
    labelings: Vec<Vec<String>>,
}

fn tally_text(tallies: &[Tally]) -> String {
    tallies
        .iter()
        .map(|t| format!("{}: {}", t.value, t.count))
        .collect::<Vec<_>>()
        .join("\n")
}

fn linkograph_text(linko: &Linkograph) -> String {
    linko.to_csv_string()
}

pub fn run(args: &EnumArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        EnumCommands::Encode { linkographs } => {
            let encoded = linkographs
                .iter()
                .map(|path| Ok(encode(&read_linkograph(path)?)))
                .collect::<anyhow::Result<Vec<Enumeration>>>()?;
            emit(&encoded, ctx.format, |encoded| {
                encoded
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        EnumCommands::Decode { length, code } => {
            let linko = decode(&Enumeration::new(*length, code.clone()))?;
            let content = match ctx.format {
                OutputFormat::Json => linko.to_json_pretty()?,
                OutputFormat::Text => linkograph_text(&linko),
            };
            write_output(&content, None)
        }
        EnumCommands::Range { length, start, end } => {
            let decoded: Vec<Linkograph> = decode_range(*length, *start..*end)?.collect();
            emit(&decoded, ctx.format, |decoded| {
                decoded
                    .iter()
                    .map(|linko| format!("{}\n{}", encode(linko), linkograph_text(linko)))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        EnumCommands::Frequency {
            length,
            ontology,
            by,
            classes,
            samples,
            random,
            seed,
            histogram: grouped,
        } => {
            let ontology: Ontology = read_json(ontology)?;

            let mut options = FrequencyOptions::new();
            if let Some(classes) = classes {
                options = options.with_classes(classes.clone());
            }
            if let Some(samples) = samples.or(ctx.config.samples) {
                options = options.with_samples(samples);
            }
            if *random {
                options = options.randomized(seed.or(ctx.config.seed));
            }

            let key = |linko: &Linkograph| by.key(linko);
            if *grouped {
                let groups: Vec<Group> = histogram(*length, &ontology, key, &options)?
                    .into_iter()
                    .map(|(value, labelings)| Group {
                        value,
                        labelings: labelings.into_iter().collect(),
                    })
                    .collect();
                emit(&groups, ctx.format, |groups| {
                    groups
                        .iter()
                        .map(|g| {
                            let labelings: Vec<String> =
                                g.labelings.iter().map(|l| l.join(" ")).collect();
                            format!("{}: {}", g.value, labelings.join(", "))
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            } else {
                let tallies = frequency(*length, &ontology, key, &options)?;
                emit(&into_tallies(tallies), ctx.format, |t| tally_text(t))
            }
        }
        EnumCommands::Windows {
            linkographs,
            size,
            overlap,
        } => {
            let graphs = linkographs
                .iter()
                .map(|path| read_linkograph(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let counts = sub_linkograph_frequency(&graphs, *size, *overlap, |g| encode(g).code);
            let tallies = counts
                .into_iter()
                .map(|(code, count)| Tally {
                    value: code.to_string(),
                    count,
                })
                .collect::<Vec<_>>();
            emit(&tallies, ctx.format, |t| tally_text(t))
        }
    }
}

fn into_tallies(counts: BTreeMap<String, usize>) -> Vec<Tally> {
    counts
        .into_iter()
        .map(|(value, count)| Tally { value, count })
        .collect()
}

pub fn run_ontology(args: &OntologyArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let ontology = ontology_from_codes(&args.codes, args.classes.as_deref())?;
    emit(&ontology, ctx.format, |ontology| {
        ontology
            .iter()
            .map(|(class, targets)| format!("{}: {}", class, targets.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    })
}
