use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Pulls the caller's key from `X-API-Key` or an `Authorization: Bearer` header.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
}

/// Rejects requests without a configured API key. With no keys configured
/// the API stays open.
pub async fn apikey_auth_middleware(
    State(app_state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let allowed = &app_state.config.api_keys;
    if allowed.is_empty() {
        return Ok(next.run(req).await);
    }

    let verdict = presented_key(req.headers()).map(|key| allowed.iter().any(|k| k == key));
    match verdict {
        Some(true) => Ok(next.run(req).await),
        Some(false) => {
            log::warn!("Rejected request to {} with unknown API key", req.uri().path());
            Err(AppError::authentication("API key invalid"))
        }
        None => Err(AppError::authentication("API key required")),
    }
}
