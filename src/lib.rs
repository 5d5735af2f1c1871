//! Training-institute management backend: REST CRUD over a declarative
//! entity registry, plus token-based authentication.

pub mod auth;
pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod migrate;
pub mod model;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;
pub mod validate;

pub use auth::{Claims, TokenSigner};
pub use config::AppConfig;
pub use error::AppError;
pub use migrate::{ensure_database_exists, ensure_tables};
pub use model::Registry;
pub use routes::build_router;
pub use state::AppState;
pub use store::EntityStore;
