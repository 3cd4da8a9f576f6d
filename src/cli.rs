// src/cli.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ghost Hand - control the pointer with hand gestures
#[derive(Parser, Debug)]
#[command(name = "ghost-hand")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive a session from a recorded landmark stream (JSON Lines)
    Replay {
        /// Recording to replay
        input: PathBuf,

        /// Write the session log (CSV + summary) under this directory
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Profile to use instead of the current one
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Inspect or initialise the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the sanitised configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List profiles
    Profiles,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
