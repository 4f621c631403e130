use kuku_entitlement::EntitlementError;
use kuku_remote::ClientError;
use kuku_session::SessionError;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] kuku_config::ConfigError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("{0}")]
    Entitlement(#[from] EntitlementError),

    #[error("Failed to initialize logger: {message}")]
    Logger { message: String },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read password from stdin: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// One line telling the user what to do next.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => {
                Some("Check ~/.kuku/config.toml or the KUKU_* environment variables.")
            }
            Self::Session(e) => Some(e.recovery_hint()),
            Self::Client(e) => Some(e.recovery_hint()),
            Self::Entitlement(e) => Some(e.recovery_hint()),
            Self::NotSignedIn => Some("Run `kuku login <email>` first."),
            Self::Logger { .. } | Self::ReadFile { .. } | Self::Prompt(_) | Self::Output(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
