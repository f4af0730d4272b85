//! Repository for the `deck_cards` table.

use decklab_core::deck::{DeckEntry, Zone, ZoneCounts};
use decklab_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::deck::{DeckCardDetail, DeckEntryRow, PreviewCard};

/// Joins a card's first image (lowest id) onto `cards c`.
const FIRST_IMAGE_JOIN: &str = "LEFT JOIN LATERAL (
        SELECT ci.image_url, ci.image_url_small FROM card_images ci
        WHERE ci.card_id = c.id
        ORDER BY ci.id
        LIMIT 1
    ) img ON TRUE";

/// Provides bulk writes and aggregate reads over a deck's cards.
pub struct DeckCardRepo;

impl DeckCardRepo {
    /// Bulk insert one row per entry. Returns the number of inserted rows.
    pub async fn insert_many(
        conn: &mut PgConnection,
        deck_id: DbId,
        entries: &[DeckEntry],
    ) -> Result<u64, sqlx::Error> {
        if entries.is_empty() {
            return Ok(0);
        }

        let card_ids: Vec<DbId> = entries.iter().map(|e| e.card_id).collect();
        let zones: Vec<&str> = entries.iter().map(|e| e.zone.as_str()).collect();
        let quantities = entries
            .iter()
            .map(|e| i32::try_from(e.quantity).map_err(|err| sqlx::Error::Encode(Box::new(err))))
            .collect::<Result<Vec<i32>, _>>()?;

        let result = sqlx::query(
            "INSERT INTO deck_cards (deck_id, card_id, zone, quantity)
             SELECT $1, u.card_id, u.zone, u.quantity
             FROM UNNEST($2::BIGINT[], $3::TEXT[], $4::INTEGER[]) AS u(card_id, zone, quantity)",
        )
        .bind(deck_id)
        .bind(&card_ids)
        .bind(&zones)
        .bind(&quantities)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Remove every card row of a deck. Returns the number of removed rows.
    pub async fn delete_by_deck(conn: &mut PgConnection, deck_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deck_cards WHERE deck_id = $1")
            .bind(deck_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// The deck's rows as normalized entries, in insertion order.
    pub async fn list_entries(pool: &PgPool, deck_id: DbId) -> Result<Vec<DeckEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DeckEntryRow>(
            "SELECT card_id, zone, quantity FROM deck_cards WHERE deck_id = $1 ORDER BY id",
        )
        .bind(deck_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_entry().map_err(|e| sqlx::Error::Decode(Box::new(e))))
            .collect()
    }

    /// The deck's rows joined with catalog data, in insertion order.
    pub async fn list_details(
        pool: &PgPool,
        deck_id: DbId,
    ) -> Result<Vec<DeckCardDetail>, sqlx::Error> {
        let query = format!(
            "SELECT c.id, c.name, c.card_type, c.frame_type, c.description, c.race,
                    c.attribute, c.archetype, c.level, c.atk, c.def,
                    dc.zone, dc.quantity, img.image_url, img.image_url_small
             FROM deck_cards dc
             JOIN cards c ON c.id = dc.card_id
             {FIRST_IMAGE_JOIN}
             WHERE dc.deck_id = $1
             ORDER BY dc.id"
        );
        sqlx::query_as::<_, DeckCardDetail>(&query)
            .bind(deck_id)
            .fetch_all(pool)
            .await
    }

    /// Sum of quantities per zone.
    pub async fn zone_counts(pool: &PgPool, deck_id: DbId) -> Result<ZoneCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT zone, COALESCE(SUM(quantity), 0)::BIGINT
             FROM deck_cards
             WHERE deck_id = $1
             GROUP BY zone",
        )
        .bind(deck_id)
        .fetch_all(pool)
        .await?;

        let mut counts = ZoneCounts::default();
        for (zone, total) in rows {
            let zone: Zone = zone.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            counts.add(zone, total);
        }
        Ok(counts)
    }

    /// Sum of quantities across all zones.
    pub async fn total_quantity(pool: &PgPool, deck_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM deck_cards WHERE deck_id = $1",
        )
        .bind(deck_id)
        .fetch_one(pool)
        .await
    }

    /// The first `limit` cards of a deck with their small image.
    pub async fn preview(
        pool: &PgPool,
        deck_id: DbId,
        limit: i64,
    ) -> Result<Vec<PreviewCard>, sqlx::Error> {
        let query = format!(
            "SELECT c.id, c.name, c.card_type, dc.zone, img.image_url_small AS image
             FROM deck_cards dc
             JOIN cards c ON c.id = dc.card_id
             {FIRST_IMAGE_JOIN}
             WHERE dc.deck_id = $1
             ORDER BY dc.id
             LIMIT $2"
        );
        sqlx::query_as::<_, PreviewCard>(&query)
            .bind(deck_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
