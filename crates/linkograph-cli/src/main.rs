//! Linko CLI - Command line interface for the linkograph engine

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, enumerate, graph, label, stats};
use config::{config_file_path, Config};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "linko")]
#[command(author, version, about = "Build and analyze linkographs from command sessions")]
pub struct Cli {
    /// Config file (default: <config dir>/linkograph/config.toml)
    #[arg(short, long, global = true, env = "LINKO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Label a command session with a rule file
    Label(label::LabelArgs),
    /// Pick commands out of a session by index
    Select(label::SelectArgs),
    /// Build a linkograph from a labeling and an ontology
    Create(graph::CreateArgs),
    /// Check that a linkograph's backlinks and forelinks agree
    Check(graph::CheckArgs),
    /// Compute statistics of a linkograph
    Stats(stats::StatsArgs),
    /// Encode, decode and count linkograph topologies
    Enum(enumerate::EnumArgs),
    /// Build an ontology from adjacency codes
    Ontology(enumerate::OntologyArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Settings resolved from the command line and the config file
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = config_file_path(cli.config.as_deref());
        tracing::debug!("Using config at: {:?}", config_path);

        let config = Config::load(&config_path)?;
        let format = cli.format.unwrap_or(config.output_format);

        Ok(Self {
            config,
            config_path,
            format,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting linko CLI");

    let ctx = AppContext::new(&cli)?;

    match &cli.command {
        Commands::Label(args) => label::run_label(args, &ctx)?,
        Commands::Select(args) => label::run_select(args, &ctx)?,
        Commands::Create(args) => graph::run_create(args, &ctx)?,
        Commands::Check(args) => graph::run_check(args, &ctx)?,
        Commands::Stats(args) => stats::run(args, &ctx)?,
        Commands::Enum(args) => enumerate::run(args, &ctx)?,
        Commands::Ontology(args) => enumerate::run_ontology(args, &ctx)?,
        Commands::Config(args) => config_cmd::run(args, &ctx)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
