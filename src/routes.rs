//! Router assembly: public health/version and login routes, token-gated
//! entity routes dispatched by path segment.

use crate::auth::require_auth;
use crate::handlers::{auth, entity, remarks};
use crate::state::AppState;
use axum::{
    extract::State,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let database = if sqlx::query("SELECT 1").fetch_optional(&state.pool).await.is_ok() {
        Some("ok")
    } else {
        Some("unavailable")
    };
    Json(HealthBody { status: "ok", database })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/v1/login", post(auth::login))
        .route("/v1/centers/login", post(auth::center_login))
        .with_state(state.clone());

    // Static segments (remarks, centers/login) win over the generic
    // :path_segment captures, so the dedicated routes shadow the generic
    // ones where they overlap.
    let protected = Router::new()
        .route("/v1/remarks/:enquiry_id", post(remarks::add).get(remarks::history))
        .route("/v1/:path_segment", get(entity::list).post(entity::create))
        .route(
            "/v1/:path_segment/:id",
            get(entity::read)
                .put(entity::update)
                .delete(entity::remove),
        )
        .route("/v1/:path_segment/:id/status", patch(entity::toggle))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public)
        .merge(protected)
        // The API is consumed by a browser frontend on another origin.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
