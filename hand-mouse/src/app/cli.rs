//! Command-Line Interface

use super::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hand Mouse - Control the pointer with hand gestures
#[derive(Parser, Debug)]
#[command(name = "hand-mouse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track the hand and drive the pointer
    Run {
        /// Log pointer actions instead of performing them
        #[arg(long)]
        dry_run: bool,

        /// Also save the tracker stream as a recording with this name
        #[arg(short, long)]
        record: Option<String>,

        /// Stop after this many frames
        #[arg(short, long)]
        max_frames: Option<u64>,
    },

    /// Run a recorded session through the gesture pipeline
    Replay {
        /// Recording file
        #[arg(short, long)]
        input: PathBuf,

        /// Drive the real pointer instead of logging
        #[arg(long)]
        live: bool,
    },

    /// List recordings
    List {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a recording
    Delete {
        /// Recording name to delete
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "gesture.click_trigger_distance", "frame.mirror_x")
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the recording directory
    pub fn recordings_dir() -> PathBuf {
        Config::home_dir().join("recordings")
    }
}
