//! Transaction-scoped identity resolution helpers.

use sqlx::{PgPool, Postgres, Row, Transaction};

use super::models::AppUser;

/// Resolve an external subject to a user row, creating it on first sight.
///
/// Runs inside the caller's transaction so that a creation rolled back with
/// the enclosing operation leaves no orphan user behind.
///
/// # Arguments
///
/// * `tx` - Enclosing database transaction
/// * `external_id` - Stable subject from the identity provider
///
/// # Returns
///
/// * `Result<AppUser, sqlx::Error>` - Resolved user or storage error
pub async fn resolve(
    tx: &mut Transaction<'_, Postgres>,
    external_id: &str,
) -> Result<AppUser, sqlx::Error> {
    let existing = sqlx::query(
        "SELECT id, external_id, display_name, push_token
         FROM users
         WHERE external_id = $1 AND NOT deleted",
    )
    .bind(external_id)
    .fetch_optional(&mut **tx)
    .await?;

    let row = match existing {
        Some(row) => row,
        None => {
            sqlx::query(
                "INSERT INTO users (external_id)
                 VALUES ($1)
                 RETURNING id, external_id, display_name, push_token",
            )
            .bind(external_id)
            .fetch_one(&mut **tx)
            .await?
        }
    };

    Ok(map_user(&row))
}

/// Look up a user by external subject without creating one.
///
/// Used by read paths where an unknown caller is a permission failure
/// rather than a first sign-in.
pub async fn find_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<AppUser>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, external_id, display_name, push_token
         FROM users
         WHERE external_id = $1 AND NOT deleted",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(map_user))
}

fn map_user(row: &sqlx::postgres::PgRow) -> AppUser {
    AppUser {
        id: row.get("id"),
        external_id: row.get("external_id"),
        display_name: row.get("display_name"),
        push_token: row.get("push_token"),
    }
}
