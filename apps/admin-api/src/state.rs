//! Shared application state.

use axum_helpers::TokenVerifier;
use mongodb::{Client, Database};

/// Cloned into the router builders; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Shares the underlying connection pool
    pub mongo_client: Client,
    pub db: Database,
    pub verifier: TokenVerifier,
}
