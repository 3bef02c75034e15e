//! Command-line interface of the algebrach binary.

mod commands;
mod run;

pub use commands::{Cli, Commands};
pub use run::{check_once, run_bot};
