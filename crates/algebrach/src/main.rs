//! Algebrach binary.
//!
//! - `algebrach run` polls Telegram and serves the health endpoint (default)
//! - `algebrach health` reads the kek base once and reports

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_once, run_bot};

    let cli = Cli::parse();
    algebrach::init_logging(cli.verbose, cli.json_logs);

    match cli.command.unwrap_or_default() {
        Commands::Run => run_bot().await?,
        Commands::Health => {
            if !check_once().await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
