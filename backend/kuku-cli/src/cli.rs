use crate::commands::Commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "kuku")]
#[command(about = "Poultry farm account, plan and disease-prediction CLI")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log warnings and errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,
}
