use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Route-layer middleware for routes where every method needs a caller.
/// Runs before any extractor, so unauthenticated requests never reach body
/// parsing or lookups.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state.auth.authenticate(request.headers()).map_err(|e| {
        tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Per-handler authentication for routes that mix public and protected
/// methods. Reuses the user `require_auth` already attached, if any.
#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let user = state.auth.authenticate(&parts.headers)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
