//! Deck card pool resolution.
//!
//! A deck's eligible pool is the set of its non-deleted join entries whose
//! backing card (if any) is non-deleted and which are either shared or
//! owned by the acting user. The pool is re-queried on every call; there is
//! no caching layer.

pub mod models;
pub mod source;

pub use models::PoolCard;
pub use source::cards_for_deck;
