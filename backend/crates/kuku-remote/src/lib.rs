//! HTTP adapters for the hosted backend.
//!
//! [`SupabaseClient`] implements [`kuku_core::RemoteStore`] over the auth
//! service and the PostgREST row API. [`PredictionClient`] talks to the
//! external disease-classification service.

mod error;
mod prediction_client;
mod response;
mod supabase_client;

pub use error::{ClientError, Result as ClientErrorResult};
pub use prediction_client::{HealthStatus, PredictionClient};
pub use supabase_client::{SESSION_KEY, SupabaseClient};
