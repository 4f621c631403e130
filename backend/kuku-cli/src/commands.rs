use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with e-mail and password
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in identity and role
    Whoami,

    /// Show the current plan, its limits and usage
    Plan,

    /// Check whether a limit allows one more action
    Check {
        /// Limit name, e.g. max_predictions or batchManagement
        limit: String,
        /// Current usage; fetched from the server when omitted
        #[arg(long)]
        usage: Option<u64>,
    },

    /// Submit an image for disease prediction
    Predict {
        image: PathBuf,
        /// Category label sent with the image
        #[arg(long)]
        category: Option<String>,
    },

    /// Check the prediction service
    Health,
}
