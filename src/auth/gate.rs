//! Bearer-token gate for protected routes. On success the decoded claims are
//! attached to the request for downstream handlers.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Access denied. No token provided.".into()))?;

    let claims = state
        .signer
        .verify(&token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token.".into()))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Token abc".parse().unwrap());
        assert!(extract_bearer(&headers).is_none());
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer   ".parse().unwrap());
        assert!(extract_bearer(&headers).is_none());
    }
}
