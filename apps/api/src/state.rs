use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::storage::ProofStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Where uploaded completion proofs go. S3/MinIO in production.
    pub proof_store: Arc<dyn ProofStore>,
}
