//! Repository for the `decks` table.

use sqlx::{PgConnection, PgPool};
use decklab_core::types::DbId;

use crate::models::deck::{CreateDeck, Deck, DeckSummary, UpdateDeck};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, description, created_at, updated_at";

/// Provides CRUD operations for decks.
pub struct DeckRepo;

impl DeckRepo {
    /// Insert a new deck, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &CreateDeck) -> Result<Deck, sqlx::Error> {
        let query = format!(
            "INSERT INTO decks (user_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(conn)
            .await
    }

    /// Find a deck by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deck>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decks WHERE id = $1");
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a deck row for the rest of the transaction, but only if it is
    /// owned by `user_id`.
    pub async fn lock_owned(
        conn: &mut PgConnection,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Deck>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decks WHERE id = $1 AND user_id = $2 FOR UPDATE");
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// List all decks owned by a user, most recently updated first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Deck>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decks
             WHERE user_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// One page of decks across all users with per-zone card totals.
    pub async fn list_summaries(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DeckSummary>, sqlx::Error> {
        sqlx::query_as::<_, DeckSummary>(
            "SELECT d.id, d.user_id, d.name, d.description, d.created_at, d.updated_at,
                    COALESCE(SUM(dc.quantity) FILTER (WHERE dc.zone = 'main'), 0)::BIGINT AS main_count,
                    COALESCE(SUM(dc.quantity) FILTER (WHERE dc.zone = 'extra'), 0)::BIGINT AS extra_count,
                    COALESCE(SUM(dc.quantity) FILTER (WHERE dc.zone = 'side'), 0)::BIGINT AS side_count,
                    COALESCE(SUM(dc.quantity), 0)::BIGINT AS card_count
             FROM decks d
             LEFT JOIN deck_cards dc ON dc.deck_id = d.id
             GROUP BY d.id
             ORDER BY d.updated_at DESC, d.id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Total number of decks.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM decks")
            .fetch_one(pool)
            .await
    }

    /// Overwrite name and description and bump `updated_at`.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateDeck,
    ) -> Result<Deck, sqlx::Error> {
        let query = format!(
            "UPDATE decks SET name = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(conn)
            .await
    }

    /// Permanently delete a deck row. Returns `true` if a row was removed.
    ///
    /// Callers remove the deck's cards first in the same transaction.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM decks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
