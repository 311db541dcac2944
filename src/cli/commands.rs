//! Command definitions for the session sync CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Cross-device Pomodoro session timer
#[derive(Parser, Debug)]
#[command(
    name = "pomosync",
    version,
    about = "Pomodoro timer with cloud and companion-device sync",
    long_about = "A Pomodoro timer whose session state follows you across devices.\n\
                  Sessions replicate through a shared cloud record, a paired-device\n\
                  channel, and a local mirror fast enough for widget reads.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a focus session
    Start(StartArgs),

    /// Start a break session
    Break(BreakArgs),

    /// Stop the current session and reset to idle
    Stop,

    /// Show the current session and remaining time
    Status,

    /// Run the sync loop with a live countdown
    Run,

    /// Print the widget timeline for the current session
    Widget,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Session Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Focus duration in minutes (1-120)
    #[arg(
        short,
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub minutes: u32,
}

impl Default for StartArgs {
    fn default() -> Self {
        Self { minutes: 25 }
    }
}

/// Arguments for the break command
#[derive(Args, Debug, Clone)]
pub struct BreakArgs {
    /// Break duration in minutes (1-60)
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub minutes: u32,
}

impl Default for BreakArgs {
    fn default() -> Self {
        Self { minutes: 5 }
    }
}

// ============================================================================
// Tests
// ============================================================================
