//! CLI command definitions.

use clap::{Parser, Subcommand};

/// Algebrach - kek bot of the mechmath chat
#[derive(Parser, Debug)]
#[command(name = "algebrach")]
#[command(about = "Kek bot of the mechmath chat", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute, `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Poll Telegram and serve the health endpoint
    #[default]
    Run,

    /// Read the kek base once; exits non-zero when unhealthy
    Health,
}
