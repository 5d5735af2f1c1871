use institute_api::{
    build_router, ensure_database_exists, ensure_tables, AppConfig, AppState, Registry,
    TokenSigner,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("institute_api=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    let registry = Arc::new(Registry::new());
    ensure_tables(&pool, &registry).await?;

    let state = AppState {
        pool,
        registry,
        signer: TokenSigner::new(&config.jwt_secret, config.token_ttl_secs),
    };
    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
