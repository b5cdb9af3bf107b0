//! Card distribution engine.
//!
//! Pure and stateless: turns an eligible card pool, a participant list,
//! and a game mode into per-participant hands. The RNG is injected so
//! callers (and tests) control the shuffle.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::decks::PoolCard;

use super::models::GameMode;

/// One participant's dealt hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    pub player_id: i64,
    pub cards: Vec<PoolCard>,
}

/// Distribute a card pool across participants.
///
/// - `all` mode: every participant receives an independent copy of the
///   entire pool.
/// - `deal` mode: the pool is shuffled once and split into contiguous
///   batches of `hand_size` cards, or `floor(pool / participants)` when no
///   hand size is given. Remainder cards are dropped, not redistributed.
///   Batch bounds are clamped so an oversized hand size truncates to the
///   cards available.
///
/// Every hand is then extended with exactly `wildcard_count` synthetic
/// wildcard entries. Duplicate participant ids are dealt once; an empty
/// participant list yields an empty distribution.
pub fn deal(
    pool: &[PoolCard],
    participants: &[i64],
    mode: GameMode,
    hand_size: Option<usize>,
    wildcard_count: usize,
    rng: &mut impl Rng,
) -> Vec<Hand> {
    let players = dedup(participants);
    if players.is_empty() {
        return Vec::new();
    }

    let mut hands: Vec<Hand> = match mode {
        GameMode::All => players
            .iter()
            .map(|&player_id| Hand {
                player_id,
                cards: pool.to_vec(),
            })
            .collect(),
        GameMode::Deal => {
            let mut shuffled = pool.to_vec();
            shuffled.shuffle(rng);

            let batch = hand_size.unwrap_or(shuffled.len() / players.len());
            players
                .iter()
                .enumerate()
                .map(|(i, &player_id)| {
                    // Saturating: an absurd hand size must clamp, not overflow.
                    let start = i.saturating_mul(batch).min(shuffled.len());
                    let end = start.saturating_add(batch).min(shuffled.len());
                    Hand {
                        player_id,
                        cards: shuffled[start..end].to_vec(),
                    }
                })
                .collect()
        }
    };

    for hand in &mut hands {
        hand.cards
            .extend(std::iter::repeat_with(PoolCard::wildcard).take(wildcard_count));
    }

    hands
}

fn dedup(participants: &[i64]) -> Vec<i64> {
    let mut seen = Vec::with_capacity(participants.len());
    for &id in participants {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}
