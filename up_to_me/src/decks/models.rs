//! Deck pool data models.

use serde::{Deserialize, Serialize};

/// One eligible entry of a deck's card pool, ready for dealing.
///
/// A wildcard entry has no backing card; its title and description stay
/// empty until the dealt copy is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCard {
    pub title: String,
    pub description: String,
    pub wildcard: bool,
    pub card_id: Option<i64>,
}

impl PoolCard {
    /// A synthetic wildcard entry, injected by the dealer.
    pub fn wildcard() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            wildcard: true,
            card_id: None,
        }
    }
}
