//! Login flows. Users and center accounts authenticate against the same
//! credential service; center accounts additionally refuse login while
//! suspended.

use crate::auth::password;
use crate::error::AppError;
use crate::model::EntitySpec;
use crate::response::LoginBody;
use crate::state::AppState;
use crate::store::EntityStore;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct CenterLoginRequest {
    #[serde(rename = "emailId")]
    pub email_id: Option<String>,
    pub password: Option<String>,
}

fn entity(state: &AppState, path: &str) -> Result<&'static EntitySpec, AppError> {
    state
        .registry
        .by_path(path)
        .ok_or_else(|| AppError::Config(format!("{} entity missing from registry", path)))
}

fn stored_hash(row: &Value) -> Result<&str, AppError> {
    row.get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Config("account record has no password hash".into()))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginBody>, AppError> {
    let (Some(email), Some(pass)) = (req.email, req.password) else {
        return Err(AppError::BadRequest("Email and password are required.".into()));
    };

    let users = entity(&state, "user")?;
    let found = EntityStore::find_by(&state.pool, users, "email", &Value::String(email.clone()))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    if !password::verify(&pass, stored_hash(&found)?)? {
        return Err(AppError::Unauthorized("Invalid credentials.".into()));
    }

    let id = found.get("id").and_then(Value::as_i64).unwrap_or_default();
    let token = state.signer.issue(id, &email, "user")?;
    Ok(Json(LoginBody {
        message: "Login successful".into(),
        token,
        user: json!({
            "id": id,
            "name": found.get("name"),
            "email": email,
        }),
    }))
}

pub async fn center_login(
    State(state): State<AppState>,
    Json(req): Json<CenterLoginRequest>,
) -> Result<Json<LoginBody>, AppError> {
    let (Some(email_id), Some(pass)) = (req.email_id, req.password) else {
        return Err(AppError::BadRequest("Email and password are required.".into()));
    };

    let centers = entity(&state, "centers")?;
    let found = EntityStore::find_by(
        &state.pool,
        centers,
        "emailId",
        &Value::String(email_id.clone()),
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| AppError::NotFound("Center".into()))?;

    // Suspension is checked before credentials so a suspended center gets
    // the suspension message even with the right password.
    let active = found.get("status").and_then(Value::as_bool).unwrap_or(false);
    if !active {
        return Err(AppError::Forbidden("This center has been suspended".into()));
    }

    if !password::verify(&pass, stored_hash(&found)?)? {
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    let id = found.get("id").and_then(Value::as_i64).unwrap_or_default();
    let token = state.signer.issue(id, &email_id, "center")?;
    Ok(Json(LoginBody {
        message: "Login successful".into(),
        token,
        user: json!({
            "id": id,
            "centerId": found.get("centerId"),
            "centerName": found.get("centerName"),
            "emailId": email_id,
        }),
    }))
}
