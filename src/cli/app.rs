use super::commands::config::ConfigCommands;
use super::commands::demo::DemoCommands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "view-frame-demo")]
#[command(about = "Drive the view frame through scripted navigation scenarios")]
pub struct Cli {
    /// Frame config file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Where to write the log (truncated on each run)
    #[arg(long, global = true, default_value = "view-frame-demo.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a navigation scenario against console-backed views
    Demo(DemoCommands),
    /// Frame configuration helpers
    Config(ConfigCommands),
}
