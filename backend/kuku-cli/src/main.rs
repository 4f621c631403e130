//! kuku - poultry farm account CLI
//!
//! # Examples
//!
//! ```bash
//! # Sign in (password is read from stdin when --password is omitted)
//! kuku login farmer@example.com
//!
//! # Show plan, limits and usage
//! kuku plan
//!
//! # Ask whether one more batch is allowed
//! kuku check max_batches --usage 3
//!
//! # Classify an image, gated by the monthly prediction quota
//! kuku predict droppings.jpg --category poultry
//! ```

use kuku_cli::{App, Cli, CliError, Outcome, logger};
use kuku_config::Config;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            if let Some(hint) = e.hint() {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool, CliError> {
    // Load and validate configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize logger (before any other logging)
    let level = logger::effective_level(*config.logging.level, cli.quiet, cli.verbose);
    logger::initialize(level, config.log_file_path()?, config.logging.colored)?;

    info!("Starting kuku v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let app = App::connect(&config).await?;
    let result = app.run(cli.command).await;
    app.shutdown();

    let outcome = result?;
    print_outcome(&outcome, cli.json)?;
    Ok(outcome.success)
}

fn print_outcome(outcome: &Outcome, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome.json)?);
    } else {
        println!("{}", outcome.text);
    }
    Ok(())
}
