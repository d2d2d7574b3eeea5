use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tagfarm_core::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Parser)]
#[command(name = "tagfarm", version)]
#[command(about = "Create linkfarms from StashApp data", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the linkfarm from StashApp data
    Build {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },
    /// Clean up dangling symlinks in the linkfarm
    Clean {
        /// Show what would be removed without making changes
        #[arg(long)]
        dry_run: bool,
    },
    /// Create a sample configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}
