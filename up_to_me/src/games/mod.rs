//! Game session lifecycle and card distribution.
//!
//! This module implements:
//! - Card distribution across participants at game creation ([`dealer`])
//! - Game creation, acceptance tracking, and the derived started flag
//! - The per-card state machine: waiting -> in play -> finished, or skipped
//! - Skip quota enforcement that stays correct under concurrent skips
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use up_to_me::db::{Database, DatabaseConfig};
//! use up_to_me::games::{CreateGameParams, GameManager, GameMode};
//! use up_to_me::notify::NoopNotifier;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::development()).await?;
//!     let games = GameManager::new(Arc::new(db.pool().clone()), Arc::new(NoopNotifier));
//!
//!     let game_id = games
//!         .create_game(CreateGameParams {
//!             external_id: "auth0|abc".to_string(),
//!             deck_id: 1,
//!             participants: vec![2, 3],
//!             wildcard_count: 1,
//!             skip_quota: 2,
//!             mode: GameMode::Deal,
//!             hand_size: None,
//!         })
//!         .await?;
//!     println!("created game {game_id}");
//!     Ok(())
//! }
//! ```

pub mod dealer;
pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{GameError, GameResult};
pub use manager::{CreateGameParams, GameManager, PlayCardParams};
pub use models::{
    CardState, Game, GameCard, GameInfo, GameMode, GameSummary, ParticipantInfo,
};
