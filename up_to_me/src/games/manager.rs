//! Game session manager and card lifecycle state machine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use log::warn;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};

use crate::decks;
use crate::notify::Notifier;
use crate::users::{self, AppUser};

use super::dealer;
use super::errors::{GameError, GameResult};
use super::models::{
    CardState, Game, GameCard, GameInfo, GameMode, GameSummary, ParticipantInfo,
};

/// Parameters for [`GameManager::create_game`].
#[derive(Debug, Clone)]
pub struct CreateGameParams {
    /// Initiator's external subject
    pub external_id: String,
    /// Source deck
    pub deck_id: i64,
    /// Invited participants; the initiator is appended automatically
    pub participants: Vec<i64>,
    /// Wildcards injected into every hand
    pub wildcard_count: i32,
    /// Skip quota granted to every participant
    pub skip_quota: i32,
    /// Distribution mode
    pub mode: GameMode,
    /// Fixed hand size for `deal` mode
    pub hand_size: Option<usize>,
}

/// Parameters for [`GameManager::play_card`].
#[derive(Debug, Clone)]
pub struct PlayCardParams {
    /// Acting player's external subject
    pub external_id: String,
    /// Dealt card being played
    pub game_card_id: i64,
    /// External subject of the user assigned to perform the card
    pub performer_external_id: String,
    /// Replacement title, applied only when the card is a wildcard
    pub wildcard_title: Option<String>,
    /// Replacement description, applied only when the card is a wildcard
    pub wildcard_description: Option<String>,
}

/// Orchestrates game creation, acceptance tracking, and per-card state
/// transitions. Every mutating operation runs in one database transaction;
/// push notifications go out after commit and never fail the operation.
#[derive(Clone)]
pub struct GameManager {
    pool: Arc<PgPool>,
    notifier: Arc<dyn Notifier>,
}

impl GameManager {
    /// Create a new game manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `notifier` - Push notification dispatch capability
    pub fn new(pool: Arc<PgPool>, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Create a game: resolve the initiator, persist the game and its
    /// participant rows, deal the deck's eligible pool, and bulk-insert the
    /// resulting cards, all in one transaction.
    ///
    /// The initiator's participant row is pre-accepted; everyone else must
    /// accept before the game counts as started. Private-card visibility of
    /// the pool is anchored to the initiator.
    ///
    /// # Returns
    ///
    /// * `GameResult<i64>` - New game id or error
    pub async fn create_game(&self, params: CreateGameParams) -> GameResult<i64> {
        let wildcard_count = params.wildcard_count.max(0);
        let skip_quota = params.skip_quota.max(0);

        let mut tx = self.pool.begin().await?;

        let initiator = users::resolve(&mut tx, &params.external_id).await?;

        let mut participants = params.participants.clone();
        participants.push(initiator.id);

        let game_row = sqlx::query(
            "INSERT INTO games (creator_id, deck_id, wildcard_count, skip_quota)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(initiator.id)
        .bind(params.deck_id)
        .bind(wildcard_count)
        .bind(skip_quota)
        .fetch_one(&mut *tx)
        .await?;
        let game_id: i64 = game_row.get("id");

        let pool_cards = decks::cards_for_deck(&mut tx, params.deck_id, initiator.id).await?;
        let hands = {
            let mut rng = rand::rng();
            dealer::deal(
                &pool_cards,
                &participants,
                params.mode,
                params.hand_size,
                wildcard_count as usize,
                &mut rng,
            )
        };

        for hand in &hands {
            sqlx::query(
                "INSERT INTO game_players (game_id, user_id, accepted, skips_left)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(game_id)
            .bind(hand.player_id)
            .bind(hand.player_id == initiator.id)
            .bind(skip_quota)
            .execute(&mut *tx)
            .await?;
        }

        let rows: Vec<(i64, &decks::PoolCard)> = hands
            .iter()
            .flat_map(|hand| hand.cards.iter().map(move |card| (hand.player_id, card)))
            .collect();
        if !rows.is_empty() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO game_cards (game_id, player_id, wildcard, card_id, title, description) ",
            );
            builder.push_values(rows, |mut b, (player_id, card)| {
                b.push_bind(game_id)
                    .push_bind(player_id)
                    .push_bind(card.wildcard)
                    .push_bind(card.card_id)
                    .push_bind(&card.title)
                    .push_bind(&card.description);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        if let Err(e) = self.notify_invitees(game_id, &initiator).await {
            warn!("game {game_id}: invite notification failed: {e}");
        }

        Ok(game_id)
    }

    /// Mark the caller's participant row accepted. Idempotent: re-accepting
    /// is a no-op, not an error.
    pub async fn accept_game(&self, external_id: &str, game_id: i64) -> GameResult<()> {
        let result = sqlx::query(
            "UPDATE game_players gp
             SET accepted = TRUE
             FROM users u
             WHERE u.id = gp.user_id
               AND u.external_id = $1 AND NOT u.deleted
               AND gp.game_id = $2
               AND EXISTS (SELECT 1 FROM games g WHERE g.id = gp.game_id AND NOT g.deleted)",
        )
        .bind(external_id)
        .bind(game_id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            let game = sqlx::query("SELECT 1 FROM games WHERE id = $1 AND NOT deleted")
                .bind(game_id)
                .fetch_optional(self.pool.as_ref())
                .await?;
            return match game {
                Some(_) => Err(GameError::NotParticipant(game_id)),
                None => Err(GameError::GameNotFound(game_id)),
            };
        }

        Ok(())
    }

    /// Fetch one game as seen by the caller: metadata, participants, the
    /// derived started flag, and the caller's card projections.
    ///
    /// # Errors
    ///
    /// * `GameError::GameNotFound` - Unknown or soft-deleted game
    /// * `GameError::NotParticipant` - Caller is not invited to this game
    pub async fn game_info(&self, game_id: i64, external_id: &str) -> GameResult<GameInfo> {
        let pool = self.pool.as_ref();

        let game_row = sqlx::query(
            "SELECT id, creator_id, deck_id, wildcard_count, skip_quota, created_at, updated_at
             FROM games
             WHERE id = $1 AND NOT deleted",
        )
        .bind(game_id)
        .fetch_optional(pool)
        .await?
        .ok_or(GameError::GameNotFound(game_id))?;
        let game = map_game(&game_row);

        let caller = users::find_by_external_id(pool, external_id)
            .await?
            .ok_or(GameError::NotParticipant(game_id))?;

        let participant_rows = sqlx::query(
            "SELECT u.id AS user_id, u.display_name, gp.accepted, gp.skips_left
             FROM game_players gp
             JOIN users u ON u.id = gp.user_id
             WHERE gp.game_id = $1",
        )
        .bind(game_id)
        .fetch_all(pool)
        .await?;

        let mut participants = HashMap::new();
        let mut caller_is_participant = false;
        let mut started = true;
        for row in &participant_rows {
            let user_id: i64 = row.get("user_id");
            let accepted: bool = row.get("accepted");
            caller_is_participant |= user_id == caller.id;
            started &= accepted;
            participants.insert(
                row.get::<String, _>("display_name"),
                ParticipantInfo {
                    accepted,
                    skips_left: row.get("skips_left"),
                },
            );
        }
        if !caller_is_participant {
            return Err(GameError::NotParticipant(game_id));
        }

        let card_rows = sqlx::query(
            "SELECT id, game_id, player_id, performer_id, wildcard, card_id, title, description,
                    played_at, finished_at, skipped
             FROM game_cards
             WHERE game_id = $1 AND NOT deleted
               AND (player_id = $2 OR performer_id = $2)
             ORDER BY id",
        )
        .bind(game_id)
        .bind(caller.id)
        .fetch_all(pool)
        .await?;

        let mut cards_to_play = Vec::new();
        let mut cards_in_play = Vec::new();
        let mut cards_done = Vec::new();
        for row in &card_rows {
            let card = map_game_card(row);
            match card.state() {
                CardState::Waiting if card.player_id == caller.id => cards_to_play.push(card),
                CardState::Waiting => {}
                CardState::InPlay => cards_in_play.push(card),
                CardState::Finished | CardState::Skipped => cards_done.push(card),
            }
        }

        Ok(GameInfo {
            game,
            started,
            participants,
            cards_to_play,
            cards_in_play,
            cards_done,
        })
    }

    /// List every game the caller participates in, newest first.
    pub async fn list_games(&self, external_id: &str) -> GameResult<Vec<GameSummary>> {
        let pool = self.pool.as_ref();

        let rows = sqlx::query(
            "SELECT g.id, g.created_at, d.title AS deck_title,
                    cu.display_name AS creator_name, gp.accepted
             FROM games g
             JOIN game_players gp ON gp.game_id = g.id
             JOIN users u ON u.id = gp.user_id
             JOIN decks d ON d.id = g.deck_id
             JOIN users cu ON cu.id = g.creator_id
             WHERE u.external_id = $1 AND NOT g.deleted
             ORDER BY g.created_at DESC",
        )
        .bind(external_id)
        .fetch_all(pool)
        .await?;

        let game_ids: Vec<i64> = rows.iter().map(|row| row.get("id")).collect();
        let mut others: HashMap<i64, Vec<String>> = HashMap::new();
        if !game_ids.is_empty() {
            let participant_rows = sqlx::query(
                "SELECT gp.game_id, u.display_name
                 FROM game_players gp
                 JOIN users u ON u.id = gp.user_id
                 WHERE gp.game_id = ANY($1) AND u.external_id <> $2",
            )
            .bind(&game_ids)
            .bind(external_id)
            .fetch_all(pool)
            .await?;
            for row in participant_rows {
                others
                    .entry(row.get("game_id"))
                    .or_default()
                    .push(row.get("display_name"));
            }
        }

        Ok(rows
            .iter()
            .map(|row| {
                let id: i64 = row.get("id");
                GameSummary {
                    id,
                    created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
                    deck_title: row.get("deck_title"),
                    creator_name: row.get("creator_name"),
                    accepted: row.get("accepted"),
                    participants: others.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Play a waiting card: assign the performer and stamp the played time.
    ///
    /// Valid only for the card's assigned player and only from the waiting
    /// state; everything else surfaces as zero rows affected and maps to
    /// `CardNotFound`. A wildcard takes the caller-supplied title and
    /// description; a regular card keeps its dealt text even when
    /// replacement text is supplied. The performer is notified best-effort.
    pub async fn play_card(&self, params: PlayCardParams) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;

        let player = users::resolve(&mut tx, &params.external_id).await?;
        let performer = users::resolve(&mut tx, &params.performer_external_id).await?;

        let row = sqlx::query(
            "UPDATE game_cards
             SET performer_id = $1,
                 played_at = NOW(),
                 updated_at = NOW(),
                 title = CASE WHEN wildcard THEN $2 ELSE title END,
                 description = CASE WHEN wildcard THEN $3 ELSE description END
             WHERE id = $4
               AND player_id = $5
               AND played_at IS NULL AND NOT skipped AND NOT deleted
             RETURNING title",
        )
        .bind(performer.id)
        .bind(params.wildcard_title.unwrap_or_default())
        .bind(params.wildcard_description.unwrap_or_default())
        .bind(params.game_card_id)
        .bind(player.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(GameError::CardNotFound(params.game_card_id));
        };
        let title: String = row.get("title");

        tx.commit().await?;

        if let Some(token) = performer.push_token {
            let message = format!("You're up: {title}");
            if let Err(e) = self.notifier.send(&[token], &message).await {
                warn!(
                    "game card {}: performer notification failed: {e}",
                    params.game_card_id
                );
            }
        }

        Ok(())
    }

    /// Confirm an in-play card as finished. Valid only for the card's
    /// performer and only from the in-play state.
    pub async fn confirm_card(&self, external_id: &str, game_card_id: i64) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;

        let caller = users::resolve(&mut tx, external_id).await?;

        let result = sqlx::query(
            "UPDATE game_cards
             SET finished_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND performer_id = $2
               AND played_at IS NOT NULL AND finished_at IS NULL
               AND NOT skipped AND NOT deleted",
        )
        .bind(game_card_id)
        .bind(caller.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(classify_card_failure(&mut tx, game_card_id, caller.id, "in play").await);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Skip a waiting card, consuming one unit of the caller's skip quota.
    ///
    /// The quota check and decrement are a single conditional update, so
    /// two concurrent skips by the same user cannot both consume the last
    /// unit. A failed card transition rolls the decrement back with the
    /// transaction.
    pub async fn skip_card(&self, external_id: &str, game_card_id: i64) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;

        let caller = users::resolve(&mut tx, external_id).await?;

        let card_row = sqlx::query(
            "SELECT game_id, player_id, played_at, skipped
             FROM game_cards
             WHERE id = $1 AND NOT deleted",
        )
        .bind(game_card_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GameError::CardNotFound(game_card_id))?;

        let player_id: i64 = card_row.get("player_id");
        if player_id != caller.id {
            return Err(GameError::NotYourCard(game_card_id));
        }
        let played_at: Option<NaiveDateTime> = card_row.get("played_at");
        let skipped: bool = card_row.get("skipped");
        if played_at.is_some() || skipped {
            return Err(GameError::InvalidState {
                expected: "waiting",
            });
        }
        let game_id: i64 = card_row.get("game_id");

        let quota = sqlx::query(
            "UPDATE game_players
             SET skips_left = skips_left - 1
             WHERE game_id = $1 AND user_id = $2 AND skips_left > 0",
        )
        .bind(game_id)
        .bind(caller.id)
        .execute(&mut *tx)
        .await?;
        if quota.rows_affected() == 0 {
            return Err(GameError::NoSkipsLeft);
        }

        let marked = sqlx::query(
            "UPDATE game_cards
             SET skipped = TRUE, updated_at = NOW()
             WHERE id = $1 AND played_at IS NULL AND NOT skipped AND NOT deleted",
        )
        .bind(game_card_id)
        .execute(&mut *tx)
        .await?;
        if marked.rows_affected() == 0 {
            // Lost a race with a concurrent transition; the quota decrement
            // rolls back with the transaction.
            return Err(GameError::InvalidState {
                expected: "waiting",
            });
        }

        tx.commit().await?;
        Ok(())
    }

    /// Soft-delete a game with caller attribution, cascading to its dealt
    /// cards in the same transaction.
    pub async fn delete_game(&self, external_id: &str, game_id: i64) -> GameResult<()> {
        let mut tx = self.pool.begin().await?;

        let caller = sqlx::query("SELECT id FROM users WHERE external_id = $1 AND NOT deleted")
            .bind(external_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| GameError::UserNotFound(external_id.to_string()))?;
        let caller_id: i64 = caller.get("id");

        let result = sqlx::query(
            "UPDATE games
             SET deleted = TRUE, updated_by = $2, updated_at = NOW()
             WHERE id = $1 AND NOT deleted",
        )
        .bind(game_id)
        .bind(caller_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(GameError::GameNotFound(game_id));
        }

        // Application-level cascade: a removed game takes its cards with it.
        sqlx::query(
            "UPDATE game_cards
             SET deleted = TRUE, updated_at = NOW()
             WHERE game_id = $1 AND NOT deleted",
        )
        .bind(game_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Tell every non-initiator participant with a registered push token
    /// that they've been invited.
    async fn notify_invitees(&self, game_id: i64, initiator: &AppUser) -> anyhow::Result<()> {
        let rows = sqlx::query(
            "SELECT u.push_token
             FROM game_players gp
             JOIN users u ON u.id = gp.user_id
             WHERE gp.game_id = $1 AND u.id <> $2
               AND u.push_token IS NOT NULL AND NOT u.deleted",
        )
        .bind(game_id)
        .bind(initiator.id)
        .fetch_all(self.pool.as_ref())
        .await?;

        let tokens: Vec<String> = rows
            .into_iter()
            .filter_map(|row| row.get::<Option<String>, _>("push_token"))
            .collect();
        if tokens.is_empty() {
            return Ok(());
        }

        let name = if initiator.display_name.is_empty() {
            "Someone"
        } else {
            initiator.display_name.as_str()
        };
        self.notifier
            .send(&tokens, &format!("{name} wants to play!"))
            .await?;
        Ok(())
    }
}

/// Classify a zero-rows-affected transition of a performer-gated card
/// operation: missing row, wrong performer, or wrong state.
async fn classify_card_failure(
    tx: &mut Transaction<'_, Postgres>,
    game_card_id: i64,
    user_id: i64,
    expected: &'static str,
) -> GameError {
    let probe = sqlx::query(
        "SELECT performer_id
         FROM game_cards
         WHERE id = $1 AND NOT deleted",
    )
    .bind(game_card_id)
    .fetch_optional(&mut **tx)
    .await;

    match probe {
        Err(e) => GameError::Database(e),
        Ok(None) => GameError::CardNotFound(game_card_id),
        Ok(Some(row)) => {
            // A card with no performer yet failed on state, not on identity.
            let performer_id: Option<i64> = row.get("performer_id");
            match performer_id {
                Some(p) if p != user_id => GameError::NotYourCard(game_card_id),
                _ => GameError::InvalidState { expected },
            }
        }
    }
}

fn map_game(row: &PgRow) -> Game {
    Game {
        id: row.get("id"),
        creator_id: row.get("creator_id"),
        deck_id: row.get("deck_id"),
        wildcard_count: row.get("wildcard_count"),
        skip_quota: row.get("skip_quota"),
        created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
        updated_at: row.get::<NaiveDateTime, _>("updated_at").and_utc(),
    }
}

fn map_game_card(row: &PgRow) -> GameCard {
    GameCard {
        id: row.get("id"),
        game_id: row.get("game_id"),
        player_id: row.get("player_id"),
        performer_id: row.get("performer_id"),
        wildcard: row.get("wildcard"),
        card_id: row.get("card_id"),
        title: row.get("title"),
        description: row.get("description"),
        played_at: row
            .get::<Option<NaiveDateTime>, _>("played_at")
            .map(|dt| dt.and_utc()),
        finished_at: row
            .get::<Option<NaiveDateTime>, _>("finished_at")
            .map(|dt| dt.and_utc()),
        skipped: row.get("skipped"),
    }
}
