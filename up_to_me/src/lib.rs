//! # Up To Me
//!
//! Backend library for a prompt-card game: users build decks of prompt
//! cards and play multiplayer rounds in which cards are dealt, performed,
//! confirmed, or skipped.
//!
//! ## Architecture
//!
//! The game session lifecycle is the core of this crate:
//!
//! - **Dealing**: when a game is created, the eligible card pool of the
//!   chosen deck is distributed across all participants, either as a full
//!   copy per participant (`all` mode) or as disjoint shuffled hands
//!   (`deal` mode), plus a configured number of wildcards per hand.
//! - **Acceptance**: every invited participant must accept before the game
//!   counts as started.
//! - **Card lifecycle**: each dealt card moves `waiting -> in play ->
//!   finished`, or is skipped while waiting, bounded by a per-participant
//!   skip quota.
//!
//! All mutating operations run inside a single database transaction per
//! request; push notifications are dispatched best-effort after commit.
//!
//! ## Core Modules
//!
//! - [`db`]: PostgreSQL connection pooling
//! - [`users`]: identity resolution (external subject -> user row)
//! - [`decks`]: eligible card pool resolution for a deck
//! - [`games`]: game session manager, card distribution, card lifecycle
//! - [`notify`]: fire-and-forget push notification dispatch

/// Database connection pooling and configuration.
pub mod db;
pub use db::{Database, DatabaseConfig};

/// Identity resolution for external identity-provider subjects.
pub mod users;
pub use users::AppUser;

/// Deck card pool resolution.
pub mod decks;
pub use decks::PoolCard;

/// Game session lifecycle, card distribution, and card state machine.
pub mod games;
pub use games::{GameError, GameManager, GameMode, GameResult};

/// Push notification dispatch.
pub mod notify;
pub use notify::{NoopNotifier, Notifier, PushGateway};
