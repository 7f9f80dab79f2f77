use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use std::path::PathBuf;
use view_frame::FrameConfig;

#[derive(Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Print the effective frame config as TOML
    Show,
    /// Validate a config file without running anything
    Check {
        /// Config file to validate
        path: PathBuf,
    },
}

pub fn config_command(args: ConfigCommands, config: &FrameConfig) -> Result<()> {
    match args.command {
        ConfigSubcommands::Show => {
            let rendered = toml::to_string_pretty(config).context("Failed to render frame config")?;
            println!("{}", "Effective frame config:".bright_white().bold());
            println!("{}", rendered);
        }
        ConfigSubcommands::Check { path } => match FrameConfig::load(&path) {
            Ok(loaded) => {
                println!("{} {} is valid", "✓".bright_green().bold(), path.display().to_string().bright_green());
                match loaded.transition_timeout() {
                    Some(timeout) => println!("  transition timeout: {:?}", timeout),
                    None => println!("  transition timeout: {}", "none".dimmed()),
                }
                println!("  event capacity: {}", loaded.event_capacity);
                println!("  input blocking: {}", loaded.block_input);
            }
            Err(err) => {
                println!("{} {:#}", "❌".bright_red().bold(), err);
                return Err(err);
            }
        },
    }
    Ok(())
}
