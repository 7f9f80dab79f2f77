use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use view_frame::FrameConfig;

mod cli;
mod demo;

use cli::commands::{config_command, demo_command};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&cli.log_file)
        .with_context(|| format!("Failed to open log file {}", cli.log_file.display()))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let config = match &cli.config {
        Some(path) => FrameConfig::load(path)?,
        None => FrameConfig::default(),
    };
    info!("Starting view-frame-demo");

    match cli.command {
        Commands::Demo(args) => demo_command(args, config).await,
        Commands::Config(args) => config_command(args, &config),
    }
}
