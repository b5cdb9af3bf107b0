//! Property-based tests for the card distribution engine.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use up_to_me::decks::PoolCard;
use up_to_me::games::{GameMode, dealer};

fn pool(n: usize) -> Vec<PoolCard> {
    (0..n)
        .map(|i| PoolCard {
            title: format!("card {i}"),
            description: String::new(),
            wildcard: false,
            card_id: Some(i as i64),
        })
        .collect()
}

proptest! {
    /// In `deal` mode without a fixed hand size, every participant gets
    /// exactly floor(pool / participants) real cards, the total never
    /// exceeds the pool, and every hand carries exactly the configured
    /// number of wildcards.
    #[test]
    fn deal_mode_batch_accounting(
        pool_size in 0usize..60,
        n_players in 1usize..8,
        wildcards in 0usize..4,
        seed in any::<u64>(),
    ) {
        let players: Vec<i64> = (1..=n_players as i64).collect();
        let cards = pool(pool_size);
        let mut rng = StdRng::seed_from_u64(seed);

        let hands = dealer::deal(&cards, &players, GameMode::Deal, None, wildcards, &mut rng);

        prop_assert_eq!(hands.len(), n_players);
        let batch = pool_size / n_players;
        let mut total_real = 0usize;
        for hand in &hands {
            let real = hand.cards.iter().filter(|c| !c.wildcard).count();
            let wild = hand.cards.iter().filter(|c| c.wildcard).count();
            prop_assert_eq!(real, batch);
            prop_assert_eq!(wild, wildcards);
            total_real += real;
        }
        prop_assert_eq!(total_real, n_players * batch);
        prop_assert!(total_real <= pool_size);
    }

    /// In `all` mode, every participant's non-wildcard entries are exactly
    /// the full pool, in order.
    #[test]
    fn all_mode_full_pool_per_participant(
        pool_size in 0usize..40,
        n_players in 0usize..6,
        wildcards in 0usize..3,
        seed in any::<u64>(),
    ) {
        let players: Vec<i64> = (1..=n_players as i64).collect();
        let cards = pool(pool_size);
        let mut rng = StdRng::seed_from_u64(seed);

        let hands = dealer::deal(&cards, &players, GameMode::All, None, wildcards, &mut rng);

        prop_assert_eq!(hands.len(), n_players);
        for hand in &hands {
            let real: Vec<&PoolCard> = hand.cards.iter().filter(|c| !c.wildcard).collect();
            prop_assert_eq!(real.len(), cards.len());
            for (got, want) in real.iter().zip(cards.iter()) {
                prop_assert_eq!(*got, want);
            }
            prop_assert_eq!(hand.cards.iter().filter(|c| c.wildcard).count(), wildcards);
        }
    }

    /// A fixed hand size never reads past the shuffled pool: each hand is
    /// clamped to the cards remaining.
    #[test]
    fn fixed_hand_size_never_overruns(
        pool_size in 0usize..30,
        n_players in 1usize..6,
        hand_size in 0usize..40,
        seed in any::<u64>(),
    ) {
        let players: Vec<i64> = (1..=n_players as i64).collect();
        let cards = pool(pool_size);
        let mut rng = StdRng::seed_from_u64(seed);

        let hands = dealer::deal(&cards, &players, GameMode::Deal, Some(hand_size), 0, &mut rng);

        let total: usize = hands.iter().map(|h| h.cards.len()).sum();
        prop_assert!(total <= pool_size);
        for hand in &hands {
            prop_assert!(hand.cards.len() <= hand_size);
        }
    }
}
