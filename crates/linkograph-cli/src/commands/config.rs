//! Reading and editing the config file

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::AppContext;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get { key: String },
    /// Change one setting and save the file
    Set {
        key: String,
        /// "none" clears seed and samples
        value: String,
    },
    /// Print every setting
    List,
    /// Print where the config file lives
    Path,
    /// Write a config file holding the defaults
    Init {
        /// Replace a file that already exists
        #[arg(long)]
        force: bool,
    },
}

fn display_value(config: &Config, key: &str) -> String {
    config.get(key).unwrap_or_else(|| "(not set)".to_string())
}

pub fn run(args: &ConfigArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let path = &ctx.config_path;

    match &args.command {
        ConfigCommands::Get { key } => {
            if !Config::keys().contains(&key.as_str()) {
                anyhow::bail!(
                    "Unknown config key: {}. Available keys: {}",
                    key,
                    Config::keys().join(", ")
                );
            }
            println!("{}", display_value(&ctx.config, key));
        }
        ConfigCommands::Set { key, value } => {
            let mut updated = ctx.config.clone();
            updated.set(key, value)?;
            updated.save(path)?;
            tracing::info!("Saved {}", path.display());
            println!("{} = {}", key, display_value(&updated, key));
        }
        ConfigCommands::List => {
            println!("# {}", path.display());
            for key in Config::keys() {
                println!("{} = {}", key, display_value(&ctx.config, key));
            }
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (pass --force to replace it)",
                    path.display()
                );
            }
            Config::default().save(path)?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}
