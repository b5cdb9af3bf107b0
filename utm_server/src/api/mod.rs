//! HTTP API for the card-game server.
//!
//! # Endpoints Overview
//!
//! ## Reads (public)
//! - `GET /health` - Server health status
//! - `GET /games/?external_id=` - List the caller's games
//! - `GET /game/{id}?external_id=` - Game detail with card projections
//!
//! ## Mutations (shared secret required)
//! - `POST   /game/` - Create a game (invite, deal, persist)
//! - `DELETE /game/` - Soft-delete a game
//! - `PUT    /game/accept` - Accept an invitation
//! - `PUT    /game/play-card/` - Play a waiting card
//! - `PUT    /game/confirm-card/` - Confirm an in-play card
//! - `PUT    /game/skip-card/` - Skip a waiting card
//!
//! Mutating routes pass through a perimeter middleware that checks the
//! `x-api-secret` header against the configured shared secret.

pub mod games;
pub mod middleware;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use up_to_me::games::GameManager;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; cheap due to Arc wrappers.
#[derive(Clone)]
pub struct AppState {
    pub games: Arc<GameManager>,
    pub pool: Arc<PgPool>,
    pub api_secret: Arc<String>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/games/", get(games::list_games))
        .route("/game/{game_id}", get(games::get_game));

    let protected_routes = Router::new()
        .route("/game/", post(games::create_game).delete(games::delete_game))
        .route("/game/accept", put(games::accept_game))
        .route("/game/play-card/", put(games::play_card))
        .route("/game/confirm-card/", put(games::confirm_card))
        .route("/game/skip-card/", put(games::skip_card))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_secret,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers a liveness query, otherwise
/// `503 Service Unavailable`.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
