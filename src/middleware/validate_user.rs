use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, Principal};
use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that checks the JWT subject still exists in the store.
/// Injects the [`Principal`] built from the *stored* role, so a demoted or
/// deleted account loses access even while its token is unexpired.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Get claims from JWT middleware
    let claims = request
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = state.store.find_user(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("User validation failed: user {} not found", claims.sub);
        ApiError::forbidden("token not valid")
    })?;

    let principal = user.principal();
    if claims.role != principal.role {
        tracing::warn!(
            "Token for user {} claims role {} but stored role is {}; using stored role",
            user.id,
            claims.role,
            principal.role
        );
    }
    tracing::debug!(
        "User validation successful: {} ({}) with {} role",
        user.user_name,
        user.id,
        principal.role
    );

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Middleware for the elevated tier. Must run after [`validate_user_middleware`].
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("User validation required before admin check"))?;

    if !principal.is_admin() {
        tracing::warn!("Admin access denied for user {}", principal.id);
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}
