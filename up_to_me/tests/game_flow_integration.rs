//! End-to-end game flow tests against a real database.
//!
//! Each test provisions its own users and decks under unique external
//! subjects, so suites can run concurrently against a shared database.
//! Tests skip (with a note) when `DATABASE_URL` is unset.

use std::sync::Arc;

use sqlx::{PgPool, Row};
use up_to_me::games::{
    CreateGameParams, GameError, GameManager, GameMode, PlayCardParams,
};
use up_to_me::notify::NoopNotifier;

async fn setup() -> Option<(PgPool, GameManager)> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    };

    let pool = PgPool::connect(&url).await.expect("connect test database");
    sqlx::raw_sql(include_str!("../../schema.sql"))
        .execute(&pool)
        .await
        .expect("apply schema");

    let manager = GameManager::new(Arc::new(pool.clone()), Arc::new(NoopNotifier));
    Some((pool, manager))
}

fn unique_subject(prefix: &str) -> String {
    format!("{}_{}", prefix, rand::random::<u64>())
}

async fn create_user(pool: &PgPool, prefix: &str, name: &str) -> (i64, String) {
    let external_id = unique_subject(prefix);
    let row = sqlx::query(
        "INSERT INTO users (external_id, display_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(&external_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .expect("create user");
    (row.get("id"), external_id)
}

async fn create_deck(pool: &PgPool, titles: &[&str]) -> i64 {
    create_deck_with_owners(pool, titles.iter().map(|t| (*t, None)).collect()).await
}

/// Create a deck whose cards may be privately owned.
async fn create_deck_with_owners(pool: &PgPool, cards: Vec<(&str, Option<i64>)>) -> i64 {
    let deck_row = sqlx::query("INSERT INTO decks (title) VALUES ('test deck') RETURNING id")
        .fetch_one(pool)
        .await
        .expect("create deck");
    let deck_id: i64 = deck_row.get("id");

    for (title, owner) in cards {
        let card_row = sqlx::query(
            "INSERT INTO cards (title, description, owner_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(title)
        .bind(format!("{title} description"))
        .bind(owner)
        .fetch_one(pool)
        .await
        .expect("create card");
        let card_id: i64 = card_row.get("id");

        sqlx::query("INSERT INTO deck_cards (deck_id, card_id, owner_id) VALUES ($1, $2, $3)")
            .bind(deck_id)
            .bind(card_id)
            .bind(owner)
            .execute(pool)
            .await
            .expect("link card to deck");
    }

    deck_id
}

fn params(external_id: &str, deck_id: i64, participants: Vec<i64>) -> CreateGameParams {
    CreateGameParams {
        external_id: external_id.to_string(),
        deck_id,
        participants,
        wildcard_count: 0,
        skip_quota: 0,
        mode: GameMode::All,
        hand_size: None,
    }
}

#[tokio::test]
async fn test_create_game_all_mode_deals_full_pool_plus_wildcards() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_creator_id, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, _) = create_user(&pool, "friend", "Bob").await;
    let deck_id = create_deck(&pool, &["Dance", "Sing"]).await;

    let game_id = games
        .create_game(CreateGameParams {
            wildcard_count: 1,
            ..params(&creator_ext, deck_id, vec![friend_id])
        })
        .await
        .expect("create game");

    // 2 participants x (2 real + 1 wildcard) = 6 dealt cards.
    let row = sqlx::query(
        "SELECT COUNT(*) AS total,
                COUNT(*) FILTER (WHERE wildcard) AS wildcards,
                COUNT(*) FILTER (WHERE performer_id IS NOT NULL) AS with_performer,
                COUNT(*) FILTER (WHERE played_at IS NOT NULL) AS played
         FROM game_cards WHERE game_id = $1",
    )
    .bind(game_id)
    .fetch_one(&pool)
    .await
    .expect("count cards");

    assert_eq!(row.get::<i64, _>("total"), 6);
    assert_eq!(row.get::<i64, _>("wildcards"), 2);
    assert_eq!(row.get::<i64, _>("with_performer"), 0);
    assert_eq!(row.get::<i64, _>("played"), 0);

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    assert_eq!(info.cards_to_play.len(), 3);
    assert!(info.cards_in_play.is_empty());
    assert!(info.cards_done.is_empty());
}

#[tokio::test]
async fn test_create_game_deal_mode_drops_remainder() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, _) = create_user(&pool, "friend", "Bob").await;
    let deck_id = create_deck(&pool, &["a", "b", "c", "d", "e"]).await;

    let game_id = games
        .create_game(CreateGameParams {
            mode: GameMode::Deal,
            ..params(&creator_ext, deck_id, vec![friend_id])
        })
        .await
        .expect("create game");

    // 5 cards over 2 players: 2 each, one dropped.
    let counts = sqlx::query(
        "SELECT player_id, COUNT(*) AS n FROM game_cards
         WHERE game_id = $1 GROUP BY player_id",
    )
    .bind(game_id)
    .fetch_all(&pool)
    .await
    .expect("count per player");

    assert_eq!(counts.len(), 2);
    for row in counts {
        assert_eq!(row.get::<i64, _>("n"), 2);
    }
}

#[tokio::test]
async fn test_started_requires_every_acceptance_and_accept_is_idempotent() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, friend_ext) = create_user(&pool, "friend", "Bob").await;
    let deck_id = create_deck(&pool, &["Dance"]).await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![friend_id]))
        .await
        .expect("create game");

    // Creator is pre-accepted; the invitee is not.
    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    assert!(!info.started);

    games.accept_game(&friend_ext, game_id).await.expect("accept");
    let info = games.game_info(game_id, &friend_ext).await.expect("game info");
    assert!(info.started);

    // Re-accepting is a no-op, not an error.
    games.accept_game(&friend_ext, game_id).await.expect("re-accept");
}

#[tokio::test]
async fn test_accept_by_non_participant_is_rejected() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (_, outsider_ext) = create_user(&pool, "outsider", "Mallory").await;
    let deck_id = create_deck(&pool, &["Dance"]).await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![]))
        .await
        .expect("create game");

    let err = games.accept_game(&outsider_ext, game_id).await.unwrap_err();
    assert!(matches!(err, GameError::NotParticipant(_)));

    let err = games.game_info(game_id, &outsider_ext).await.unwrap_err();
    assert!(matches!(err, GameError::NotParticipant(_)));
}

#[tokio::test]
async fn test_play_wildcard_takes_supplied_text_and_notifies_state() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, friend_ext) = create_user(&pool, "friend", "Bob").await;
    let deck_id = create_deck(&pool, &["Dealt title"]).await;

    let game_id = games
        .create_game(CreateGameParams {
            wildcard_count: 1,
            ..params(&creator_ext, deck_id, vec![friend_id])
        })
        .await
        .expect("create game");

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    let wildcard = info
        .cards_to_play
        .iter()
        .find(|c| c.wildcard)
        .expect("wildcard dealt");

    games
        .play_card(PlayCardParams {
            external_id: creator_ext.clone(),
            game_card_id: wildcard.id,
            performer_external_id: friend_ext.clone(),
            wildcard_title: Some("Dare".to_string()),
            wildcard_description: Some("Sing".to_string()),
        })
        .await
        .expect("play wildcard");

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    let played = info
        .cards_in_play
        .iter()
        .find(|c| c.id == wildcard.id)
        .expect("wildcard in play");
    assert_eq!(played.title, "Dare");
    assert_eq!(played.description, "Sing");
    assert!(played.played_at.is_some());
    assert!(played.performer_id.is_some());
}

#[tokio::test]
async fn test_play_regular_card_keeps_dealt_text() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, friend_ext) = create_user(&pool, "friend", "Bob").await;
    let deck_id = create_deck(&pool, &["Dealt title"]).await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![friend_id]))
        .await
        .expect("create game");

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    let card = &info.cards_to_play[0];

    // Supplied text must not overwrite a non-wildcard's dealt text.
    games
        .play_card(PlayCardParams {
            external_id: creator_ext.clone(),
            game_card_id: card.id,
            performer_external_id: friend_ext.clone(),
            wildcard_title: Some("Hijacked".to_string()),
            wildcard_description: Some("Hijacked".to_string()),
        })
        .await
        .expect("play card");

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    let played = &info.cards_in_play[0];
    assert_eq!(played.title, "Dealt title");
    assert_eq!(played.description, "Dealt title description");
}

#[tokio::test]
async fn test_play_card_of_another_player_is_not_found() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, friend_ext) = create_user(&pool, "friend", "Bob").await;
    let deck_id = create_deck(&pool, &["Dance"]).await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![friend_id]))
        .await
        .expect("create game");

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    let creators_card = info.cards_to_play[0].id;

    let err = games
        .play_card(PlayCardParams {
            external_id: friend_ext.clone(),
            game_card_id: creators_card,
            performer_external_id: friend_ext.clone(),
            wildcard_title: None,
            wildcard_description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::CardNotFound(_)));
}

#[tokio::test]
async fn test_confirm_and_terminal_states() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, friend_ext) = create_user(&pool, "friend", "Bob").await;
    let deck_id = create_deck(&pool, &["Dance"]).await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![friend_id]))
        .await
        .expect("create game");

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    let card_id = info.cards_to_play[0].id;

    // Confirming a never-played card fails without mutating the row.
    let err = games.confirm_card(&creator_ext, card_id).await.unwrap_err();
    assert!(matches!(err, GameError::InvalidState { .. }));

    games
        .play_card(PlayCardParams {
            external_id: creator_ext.clone(),
            game_card_id: card_id,
            performer_external_id: friend_ext.clone(),
            wildcard_title: None,
            wildcard_description: None,
        })
        .await
        .expect("play card");

    // Only the performer may confirm: the card's own player holding the
    // wrong role is an identity failure, not a state failure.
    let err = games.confirm_card(&creator_ext, card_id).await.unwrap_err();
    assert!(matches!(err, GameError::NotYourCard(_)));

    games.confirm_card(&friend_ext, card_id).await.expect("confirm");

    let info = games.game_info(game_id, &friend_ext).await.expect("game info");
    let done = info.cards_done.iter().find(|c| c.id == card_id).expect("card done");
    assert!(done.finished_at.is_some());

    // Finished is terminal: playing it again fails, row untouched.
    let err = games
        .play_card(PlayCardParams {
            external_id: creator_ext.clone(),
            game_card_id: card_id,
            performer_external_id: friend_ext.clone(),
            wildcard_title: None,
            wildcard_description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::CardNotFound(_)));
}

#[tokio::test]
async fn test_skip_quota_is_enforced_and_never_negative() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (caller_id, caller_ext) = create_user(&pool, "caller", "Alice").await;
    let deck_id = create_deck(&pool, &["a", "b"]).await;

    let game_id = games
        .create_game(CreateGameParams {
            skip_quota: 1,
            ..params(&caller_ext, deck_id, vec![])
        })
        .await
        .expect("create game");

    let info = games.game_info(game_id, &caller_ext).await.expect("game info");
    let first = info.cards_to_play[0].id;
    let second = info.cards_to_play[1].id;

    games.skip_card(&caller_ext, first).await.expect("first skip");

    let err = games.skip_card(&caller_ext, second).await.unwrap_err();
    assert!(matches!(err, GameError::NoSkipsLeft));

    let row = sqlx::query(
        "SELECT skips_left FROM game_players WHERE game_id = $1 AND user_id = $2",
    )
    .bind(game_id)
    .bind(caller_id)
    .fetch_one(&pool)
    .await
    .expect("fetch quota");
    assert_eq!(row.get::<i32, _>("skips_left"), 0);

    // The failed skip must not have touched the second card.
    let info = games.game_info(game_id, &caller_ext).await.expect("game info");
    assert!(info.cards_to_play.iter().any(|c| c.id == second));
    assert!(info.cards_done.iter().any(|c| c.id == first && c.skipped));
}

#[tokio::test]
async fn test_deck_pool_excludes_other_users_private_cards() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (creator_id, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (stranger_id, _) = create_user(&pool, "stranger", "Carol").await;
    let deck_id = create_deck_with_owners(
        &pool,
        vec![
            ("shared", None),
            ("mine", Some(creator_id)),
            ("theirs", Some(stranger_id)),
        ],
    )
    .await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![]))
        .await
        .expect("create game");

    let info = games.game_info(game_id, &creator_ext).await.expect("game info");
    let titles: Vec<&str> = info.cards_to_play.iter().map(|c| c.title.as_str()).collect();
    assert!(titles.contains(&"shared"));
    assert!(titles.contains(&"mine"));
    assert!(!titles.contains(&"theirs"));
}

#[tokio::test]
async fn test_delete_game_cascades_to_cards() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let deck_id = create_deck(&pool, &["Dance"]).await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![]))
        .await
        .expect("create game");

    games.delete_game(&creator_ext, game_id).await.expect("delete");

    let err = games.game_info(game_id, &creator_ext).await.unwrap_err();
    assert!(matches!(err, GameError::GameNotFound(_)));

    let row = sqlx::query(
        "SELECT COUNT(*) AS live FROM game_cards WHERE game_id = $1 AND NOT deleted",
    )
    .bind(game_id)
    .fetch_one(&pool)
    .await
    .expect("count cards");
    assert_eq!(row.get::<i64, _>("live"), 0);
}

#[tokio::test]
async fn test_identity_resolver_creates_user_on_first_sight() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    // The creator's subject has never been seen; creation must still work.
    let fresh_ext = unique_subject("fresh");
    let deck_id = create_deck(&pool, &["Dance"]).await;

    let game_id = games
        .create_game(params(&fresh_ext, deck_id, vec![]))
        .await
        .expect("create game");

    let row = sqlx::query("SELECT id FROM users WHERE external_id = $1 AND NOT deleted")
        .bind(&fresh_ext)
        .fetch_optional(&pool)
        .await
        .expect("query user");
    assert!(row.is_some(), "first authenticated request creates the user");

    let info = games.game_info(game_id, &fresh_ext).await.expect("game info");
    assert!(info.started, "solo game is started immediately");
}

#[tokio::test]
async fn test_list_games_shows_only_callers_games() {
    let Some((pool, games)) = setup().await else {
        return;
    };

    let (_, creator_ext) = create_user(&pool, "creator", "Alice").await;
    let (friend_id, friend_ext) = create_user(&pool, "friend", "Bob").await;
    let (_, outsider_ext) = create_user(&pool, "outsider", "Carol").await;
    let deck_id = create_deck(&pool, &["Dance"]).await;

    let game_id = games
        .create_game(params(&creator_ext, deck_id, vec![friend_id]))
        .await
        .expect("create game");

    let listed = games.list_games(&friend_ext).await.expect("list games");
    let entry = listed.iter().find(|g| g.id == game_id).expect("game listed");
    assert!(!entry.accepted);
    assert!(entry.participants.contains(&"Alice".to_string()));

    let listed = games.list_games(&outsider_ext).await.expect("list games");
    assert!(!listed.iter().any(|g| g.id == game_id));
}
