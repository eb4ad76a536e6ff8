//! Bearer token middleware for the protected routes
//!
//! With no token configured (auth disabled) every request passes and is
//! treated as authenticated.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use orchlib_common::api::auth::{bearer_token, token_matches};
use orchlib_common::Error;
use tracing::warn;

use crate::error::ApiError;
use crate::services::Caller;
use crate::AppState;

/// Reject requests without a valid `Authorization: Bearer` token with 401.
///
/// Authenticated requests carry a [`Caller`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.api_token.as_deref() else {
        request.extensions_mut().insert(Caller { authenticated: true });
        return Ok(next.run(request).await);
    };

    let verdict = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(|token| token_matches(token, expected));

    match verdict {
        Some(true) => {
            request.extensions_mut().insert(Caller { authenticated: true });
            Ok(next.run(request).await)
        }
        Some(false) => {
            warn!("Rejected request to {}: invalid API token", request.uri().path());
            Err(ApiError(Error::Unauthenticated))
        }
        None => {
            warn!("Rejected request to {}: missing API token", request.uri().path());
            Err(ApiError(Error::Unauthenticated))
        }
    }
}
