//! Admin identity middleware
//!
//! Login itself happens in the OAuth proxy in front of the site, which
//! passes the authenticated email in the configured header. Requests with
//! no identity get 401; identities not listed in `admins` get 403.
//!
//! When `auth.debug_email` is set every request is treated as that user,
//! with admin rights.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use nbmn_common::User;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, SiteStore};

/// Reject the request unless it comes from an admin; the [`User`] is added
/// to the request extensions for the handler.
pub async fn require_admin<S: SiteStore>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user = current_admin(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn current_admin<S: SiteStore>(state: &AppState<S>, headers: &HeaderMap) -> ApiResult<User> {
    if let Some(email) = state
        .auth
        .debug_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
    {
        let admins = vec![email.to_string()];
        let user = User::login(&state.store, email, &admins).await?;
        warn!(id = user.id.as_deref().unwrap_or_default(), email, "Logged in DEBUG user");
        return Ok(user);
    }

    let header = state.auth.user_header.to_ascii_lowercase();
    let email = headers
        .get(header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("No authenticated user".to_string()))?;

    let user = User::login(&state.store, email, &state.admins).await?;
    if !user.is_admin() {
        warn!(email, "Unauthorized access attempt");
        return Err(ApiError::Forbidden(
            "You lack the requisite coolness to change movie nights".to_string(),
        ));
    }

    debug!(email, "Admin request");
    Ok(user)
}
