//! kuku-cli library
//!
//! Command wiring for the `kuku` binary, exported for tests.

pub mod app;
pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;

pub use app::{App, Outcome};
pub use cli::Cli;
pub use commands::Commands;
pub use error::{CliError, Result as CliErrorResult};
