//! Bearer-token gate for write routes.
//!
//! The token is compared against `ROOT_KEY` in constant time.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::AppState;

/// Middleware rejecting requests without the configured bearer token.
///
/// With no `ROOT_KEY` configured every guarded request is rejected.
pub async fn require_root_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.root_key.as_deref() else {
        let message = "Write access is disabled: no root key configured";
        return AppError::Unauthorized(message.to_string()).into_response();
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    match provided {
        Some(token) if constant_time_compare(token, expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Invalid token".to_string()).into_response(),
        None => AppError::Unauthorized("Missing bearer token".to_string()).into_response(),
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
