//! Shared-secret middleware for mutating endpoints.
//!
//! Every state-changing route expects an `x-api-secret` header whose value
//! matches the secret configured at startup. Read-only routes stay open so
//! clients can poll game state without holding credentials.
//!
//! # Usage
//!
//! Apply to protected routes in the router:
//!
//! ```rust,no_run
//! use axum::{Router, routing::post, middleware};
//! # use utm_server::api::middleware::require_api_secret;
//! # use utm_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router = Router::new()
//!     .route("/game/", post(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), require_api_secret));
//! # let _ = protected_routes;
//! ```

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use super::AppState;

/// Header carrying the shared API secret on mutating requests.
pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Middleware that rejects requests without the correct shared secret.
///
/// # Behavior
///
/// - **Success**: Header present and matching → calls next handler
/// - **Missing header**: Returns `401 Unauthorized`
/// - **Wrong value**: Returns `401 Unauthorized`
pub async fn require_api_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get(API_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(secret) if secret == state.api_secret.as_str() => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
