//! Game lifecycle API handlers.
//!
//! This module provides HTTP REST endpoints for game operations including:
//! - Creating a game from a deck with invited participants
//! - Listing the caller's games and fetching one game in detail
//! - Accepting invitations
//! - The card lifecycle transitions: play, confirm, skip
//! - Soft-deleting a game
//!
//! Callers identify themselves by their external subject (`external_id`);
//! the server resolves it to a local user row, creating one on first sight.
//!
//! # Examples
//!
//! Create a game:
//! ```bash
//! curl -X POST http://localhost:3000/game/ \
//!   -H "x-api-secret: SECRET" \
//!   -H "Content-Type: application/json" \
//!   -d '{"external_id": "auth0|abc", "deck": 1, "participants": [2, 3], "mode": "deal"}'
//! ```
//!
//! Fetch it back:
//! ```bash
//! curl "http://localhost:3000/game/1?external_id=auth0|abc"
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use log::error;
use serde::{Deserialize, Serialize};
use up_to_me::games::{
    CreateGameParams, GameError, GameInfo, GameMode, GameSummary, PlayCardParams,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub external_id: String,
    pub deck: i64,
    #[serde(default)]
    pub participants: Vec<i64>,
    #[serde(default)]
    pub wildcard_count: i32,
    #[serde(default)]
    pub skip_quota: i32,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub hand_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptGameRequest {
    pub external_id: String,
    pub game_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlayCardRequest {
    pub external_id: String,
    pub game_card_id: i64,
    pub performer_external_id: String,
    #[serde(default)]
    pub wildcard_title: Option<String>,
    #[serde(default)]
    pub wildcard_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmCardRequest {
    pub external_id: String,
    pub game_card_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SkipCardRequest {
    pub external_id: String,
    pub game_card_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteGameRequest {
    pub external_id: String,
    pub game_id: i64,
}

/// Caller identity for read endpoints, passed as a query parameter.
#[derive(Debug, Deserialize)]
pub struct ExternalIdQuery {
    pub external_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateGameResponse {
    pub game_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a game error to an HTTP status and client-safe body.
///
/// Database errors are logged server-side and surface as an opaque 500.
fn map_game_error(context: &str, e: GameError) -> ApiError {
    let status = match &e {
        GameError::Database(inner) => {
            error!("{context}: {inner}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        GameError::UserNotFound(_) | GameError::GameNotFound(_) | GameError::CardNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        GameError::NotParticipant(_) | GameError::NotYourCard(_) | GameError::NoSkipsLeft => {
            StatusCode::UNAUTHORIZED
        }
        GameError::InvalidState { .. } => StatusCode::CONFLICT,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.client_message(),
        }),
    )
}

/// Create a new game.
///
/// Resolves the initiator, deals the deck's eligible pool to the initiator
/// plus the invited participants, and notifies invitees best-effort.
///
/// # Response
///
/// Returns `200 OK` with the new game id:
/// ```json
/// {"game_id": 42}
/// ```
///
/// # Errors
///
/// - `500 Internal Server Error`: Database error
pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, ApiError> {
    let params = CreateGameParams {
        external_id: req.external_id,
        deck_id: req.deck,
        participants: req.participants,
        wildcard_count: req.wildcard_count,
        skip_quota: req.skip_quota,
        mode: req.mode,
        hand_size: req.hand_size,
    };
    let game_id = state
        .games
        .create_game(params)
        .await
        .map_err(|e| map_game_error("create_game", e))?;
    Ok(Json(CreateGameResponse { game_id }))
}

/// List every game the caller participates in, newest first.
///
/// # Errors
///
/// - `500 Internal Server Error`: Database error
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<ExternalIdQuery>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let games = state
        .games
        .list_games(&query.external_id)
        .await
        .map_err(|e| map_game_error("list_games", e))?;
    Ok(Json(games))
}

/// Get one game as seen by the caller.
///
/// The response includes the participant roster with acceptance flags, the
/// derived started flag, and the caller's cards partitioned by lifecycle
/// state.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or deleted game
/// - `401 Unauthorized`: Caller is not a participant
/// - `500 Internal Server Error`: Database error
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Query(query): Query<ExternalIdQuery>,
) -> Result<Json<GameInfo>, ApiError> {
    let info = state
        .games
        .game_info(game_id, &query.external_id)
        .await
        .map_err(|e| map_game_error("get_game", e))?;
    Ok(Json(info))
}

/// Accept an invitation to a game. Idempotent.
///
/// # Errors
///
/// - `404 Not Found`: Unknown or deleted game
/// - `401 Unauthorized`: Caller is not invited
/// - `500 Internal Server Error`: Database error
pub async fn accept_game(
    State(state): State<AppState>,
    Json(req): Json<AcceptGameRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .games
        .accept_game(&req.external_id, req.game_id)
        .await
        .map_err(|e| map_game_error("accept_game", e))?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Play a waiting card, assigning a performer.
///
/// For wildcards the supplied title and description replace the card text;
/// regular cards keep their dealt text.
///
/// # Errors
///
/// - `404 Not Found`: Card does not exist, is not the caller's, or is not waiting
/// - `500 Internal Server Error`: Database error
pub async fn play_card(
    State(state): State<AppState>,
    Json(req): Json<PlayCardRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let params = PlayCardParams {
        external_id: req.external_id,
        game_card_id: req.game_card_id,
        performer_external_id: req.performer_external_id,
        wildcard_title: req.wildcard_title,
        wildcard_description: req.wildcard_description,
    };
    state
        .games
        .play_card(params)
        .await
        .map_err(|e| map_game_error("play_card", e))?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Confirm an in-play card as finished. Performer only.
///
/// # Errors
///
/// - `404 Not Found`: Card does not exist
/// - `401 Unauthorized`: Caller is not the card's performer
/// - `409 Conflict`: Card is not in play
/// - `500 Internal Server Error`: Database error
pub async fn confirm_card(
    State(state): State<AppState>,
    Json(req): Json<ConfirmCardRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .games
        .confirm_card(&req.external_id, req.game_card_id)
        .await
        .map_err(|e| map_game_error("confirm_card", e))?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Skip a waiting card, consuming one unit of the caller's skip quota.
///
/// # Errors
///
/// - `404 Not Found`: Card does not exist
/// - `401 Unauthorized`: Not the caller's card, or no skips left
/// - `409 Conflict`: Card already played or skipped
/// - `500 Internal Server Error`: Database error
pub async fn skip_card(
    State(state): State<AppState>,
    Json(req): Json<SkipCardRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .games
        .skip_card(&req.external_id, req.game_card_id)
        .await
        .map_err(|e| map_game_error("skip_card", e))?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Soft-delete a game along with its dealt cards.
///
/// # Errors
///
/// - `404 Not Found`: Unknown caller or game
/// - `500 Internal Server Error`: Database error
pub async fn delete_game(
    State(state): State<AppState>,
    Json(req): Json<DeleteGameRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .games
        .delete_game(&req.external_id, req.game_id)
        .await
        .map_err(|e| map_game_error("delete_game", e))?;
    Ok(Json(SuccessResponse { success: true }))
}
