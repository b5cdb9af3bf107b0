//! Game data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the card pool is distributed at game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Every participant receives an independent copy of the entire pool.
    All,
    /// The pool is shuffled once and split into disjoint hands.
    Deal,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::All
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::All => write!(f, "all"),
            GameMode::Deal => write!(f, "deal"),
        }
    }
}

/// Game model. Immutable after creation except for soft-delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub creator_id: i64,
    pub deck_id: i64,
    pub wildcard_count: i32,
    pub skip_quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One invited participant of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub accepted: bool,
    pub skips_left: i32,
}

/// A dealt card owned by one game and one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCard {
    pub id: i64,
    pub game_id: i64,
    pub player_id: i64,
    pub performer_id: Option<i64>,
    pub wildcard: bool,
    pub card_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub played_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub skipped: bool,
}

/// Derived lifecycle state of a dealt card. Never stored; computed from
/// the timestamp and skip columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Waiting,
    InPlay,
    Finished,
    Skipped,
}

impl GameCard {
    /// Derive the lifecycle state. Skipped and finished are terminal;
    /// skipped wins the tiebreak for accounting purposes.
    pub fn state(&self) -> CardState {
        if self.skipped {
            CardState::Skipped
        } else if self.finished_at.is_some() {
            CardState::Finished
        } else if self.played_at.is_some() {
            CardState::InPlay
        } else {
            CardState::Waiting
        }
    }
}

/// Full game view for one caller: metadata, the derived started flag,
/// participants keyed by display name, and the caller's card projections.
#[derive(Debug, Clone, Serialize)]
pub struct GameInfo {
    pub game: Game,
    pub started: bool,
    pub participants: HashMap<String, ParticipantInfo>,
    pub cards_to_play: Vec<GameCard>,
    pub cards_in_play: Vec<GameCard>,
    pub cards_done: Vec<GameCard>,
}

/// One row of a caller's game list.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub deck_title: String,
    pub creator_name: String,
    pub accepted: bool,
    /// Display names of the other participants.
    pub participants: Vec<String>,
}
