//! Eligible card pool query.

use sqlx::{Postgres, Row, Transaction};

use super::models::PoolCard;

/// Fetch the eligible card pool of a deck for an acting user.
///
/// A join entry is eligible when it is not soft-deleted, its backing card
/// (if any) is not soft-deleted, and both the entry and the backing card
/// are either unowned (shared) or owned by the acting user. Ordered by
/// entry id so the sequence is stable across calls.
///
/// # Arguments
///
/// * `tx` - Enclosing database transaction
/// * `deck_id` - Deck to resolve
/// * `user_id` - Acting user anchoring private-card visibility
///
/// # Returns
///
/// * `Result<Vec<PoolCard>, sqlx::Error>` - Eligible pool or storage error
pub async fn cards_for_deck(
    tx: &mut Transaction<'_, Postgres>,
    deck_id: i64,
    user_id: i64,
) -> Result<Vec<PoolCard>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT dc.wildcard, dc.card_id,
                COALESCE(c.title, '') AS title,
                COALESCE(c.description, '') AS description
         FROM deck_cards dc
         LEFT JOIN cards c ON c.id = dc.card_id
         WHERE dc.deck_id = $1
           AND NOT dc.deleted
           AND (dc.card_id IS NULL OR NOT c.deleted)
           AND (dc.owner_id IS NULL OR dc.owner_id = $2)
           AND (dc.card_id IS NULL OR c.owner_id IS NULL OR c.owner_id = $2)
         ORDER BY dc.id",
    )
    .bind(deck_id)
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| PoolCard {
            title: row.get("title"),
            description: row.get("description"),
            wildcard: row.get("wildcard"),
            card_id: row.get("card_id"),
        })
        .collect())
}
