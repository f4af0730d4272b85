//! Repository for the card catalog (`cards` and its side tables).

use decklab_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::card::{Card, CardFilter, CardImage, CardPrice, CardSet, CardSummary, NewCard};
use crate::repositories::contains_pattern;

/// Column list for `cards c`.
const CARD_COLUMNS: &str = "c.id, c.name, c.card_type, c.frame_type, c.description, c.race, \
                            c.attribute, c.archetype, c.level, c.atk, c.def";

/// `SELECT` prefix for [`CardSummary`] rows: the card plus its first image.
const SUMMARY_FROM: &str = "FROM cards c
     LEFT JOIN LATERAL (
         SELECT ci.image_url, ci.image_url_small FROM card_images ci
         WHERE ci.card_id = c.id
         ORDER BY ci.id
         LIMIT 1
     ) img ON TRUE";

/// Provides read access to the card catalog.
pub struct CardRepo;

impl CardRepo {
    /// Insert a card together with its sets, images and prices.
    pub async fn create(pool: &PgPool, input: &NewCard) -> Result<Card, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let card = &input.card;

        let query = format!(
            "INSERT INTO cards AS c (id, name, card_type, frame_type, description, race,
                                     attribute, archetype, level, atk, def)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {CARD_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Card>(&query)
            .bind(card.id)
            .bind(&card.name)
            .bind(&card.card_type)
            .bind(&card.frame_type)
            .bind(&card.description)
            .bind(&card.race)
            .bind(&card.attribute)
            .bind(&card.archetype)
            .bind(card.level)
            .bind(card.atk)
            .bind(card.def)
            .fetch_one(&mut *tx)
            .await?;

        for set in &input.sets {
            sqlx::query(
                "INSERT INTO card_sets (card_id, set_name, set_code, set_rarity, set_price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(card.id)
            .bind(&set.set_name)
            .bind(&set.set_code)
            .bind(&set.set_rarity)
            .bind(set.set_price)
            .execute(&mut *tx)
            .await?;
        }
        for image in &input.images {
            sqlx::query(
                "INSERT INTO card_images (card_id, image_url, image_url_small, image_url_cropped)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(card.id)
            .bind(&image.image_url)
            .bind(&image.image_url_small)
            .bind(&image.image_url_cropped)
            .execute(&mut *tx)
            .await?;
        }
        for price in &input.prices {
            sqlx::query(
                "INSERT INTO card_prices (card_id, cardmarket_price, tcgplayer_price, ebay_price)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(card.id)
            .bind(price.cardmarket_price)
            .bind(price.tcgplayer_price)
            .bind(price.ebay_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    /// One page of cards matching `filter`, ordered by name.
    pub async fn search(
        pool: &PgPool,
        filter: &CardFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CardSummary>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CARD_COLUMNS}, img.image_url, img.image_url_small {SUMMARY_FROM} WHERE TRUE"
        ));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY c.name ASC, c.id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<CardSummary>().fetch_all(pool).await
    }

    /// Number of cards matching `filter`.
    pub async fn count(pool: &PgPool, filter: &CardFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cards c WHERE TRUE");
        push_filter(&mut qb, filter);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Find a card by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Card>, sqlx::Error> {
        let query = format!("SELECT {CARD_COLUMNS} FROM cards c WHERE c.id = $1");
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_sets(pool: &PgPool, card_id: DbId) -> Result<Vec<CardSet>, sqlx::Error> {
        sqlx::query_as::<_, CardSet>(
            "SELECT set_name, set_code, set_rarity, set_price
             FROM card_sets WHERE card_id = $1 ORDER BY id",
        )
        .bind(card_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_images(pool: &PgPool, card_id: DbId) -> Result<Vec<CardImage>, sqlx::Error> {
        sqlx::query_as::<_, CardImage>(
            "SELECT image_url, image_url_small, image_url_cropped
             FROM card_images WHERE card_id = $1 ORDER BY id",
        )
        .bind(card_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_prices(pool: &PgPool, card_id: DbId) -> Result<Vec<CardPrice>, sqlx::Error> {
        sqlx::query_as::<_, CardPrice>(
            "SELECT cardmarket_price, tcgplayer_price, ebay_price
             FROM card_prices WHERE card_id = $1 ORDER BY id",
        )
        .bind(card_id)
        .fetch_all(pool)
        .await
    }

    /// A uniform random sample of up to `limit` cards.
    pub async fn random(pool: &PgPool, limit: i64) -> Result<Vec<CardSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {CARD_COLUMNS}, img.image_url, img.image_url_small {SUMMARY_FROM}
             ORDER BY random()
             LIMIT $1"
        );
        sqlx::query_as::<_, CardSummary>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Cards with at least one printing whose set code contains `set_code`.
    pub async fn list_by_set_code(
        pool: &PgPool,
        set_code: &str,
    ) -> Result<Vec<CardSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {CARD_COLUMNS}, img.image_url, img.image_url_small {SUMMARY_FROM}
             WHERE EXISTS (
                 SELECT 1 FROM card_sets s
                 WHERE s.card_id = c.id AND s.set_code ILIKE $1
             )
             ORDER BY c.name ASC, c.id ASC"
        );
        sqlx::query_as::<_, CardSummary>(&query)
            .bind(contains_pattern(set_code))
            .fetch_all(pool)
            .await
    }
}

/// Append ` AND ...` clauses for every populated filter field.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CardFilter) {
    if let Some(name) = &filter.name {
        qb.push(" AND c.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(card_type) = &filter.card_type {
        qb.push(" AND c.card_type = ").push_bind(card_type.clone());
    }
    if let Some(race) = &filter.race {
        qb.push(" AND c.race = ").push_bind(race.clone());
    }
    if let Some(attribute) = &filter.attribute {
        qb.push(" AND c.attribute = ").push_bind(attribute.clone());
    }
    if let Some(archetype) = &filter.archetype {
        qb.push(" AND c.archetype = ").push_bind(archetype.clone());
    }
    if let Some(level) = filter.level {
        qb.push(" AND c.level = ").push_bind(level);
    }
    if let Some(atk_min) = filter.atk_min {
        qb.push(" AND c.atk >= ").push_bind(atk_min);
    }
    if let Some(atk_max) = filter.atk_max {
        qb.push(" AND c.atk <= ").push_bind(atk_max);
    }
}
