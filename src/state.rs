//! Shared application state, constructed once at startup and injected into
//! every route. Read-only after construction.

use crate::auth::TokenSigner;
use crate::model::Registry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<Registry>,
    pub signer: TokenSigner,
}
