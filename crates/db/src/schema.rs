//! Startup schema verification.
//!
//! The server refuses to start against a database whose schema is older than
//! the binary expects, instead of discovering missing columns mid-request.

use std::collections::HashSet;

use crate::DbPool;

/// Version of the newest migration this binary depends on.
pub const EXPECTED_SCHEMA_VERSION: i64 = 20260101000003;

/// Columns read or written by the repositories, as `(table, column)`.
pub const REQUIRED_COLUMNS: &[(&str, &str)] = &[
    ("cards", "card_type"),
    ("cards", "archetype"),
    ("card_images", "image_url_small"),
    ("card_sets", "set_code"),
    ("card_prices", "cardmarket_price"),
    ("decks", "user_id"),
    ("decks", "description"),
    ("decks", "created_at"),
    ("decks", "updated_at"),
    ("deck_cards", "zone"),
    ("deck_cards", "quantity"),
    ("sessions", "token"),
    ("sessions", "expires_at"),
];

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema check query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("database schema version {found:?} is older than required {expected}")]
    Outdated { found: Option<i64>, expected: i64 },

    #[error("database schema is missing column {table}.{column}")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Check the applied migration version and the presence of every required
/// column. Call once after migrations, before serving traffic.
pub async fn verify_schema(pool: &DbPool) -> Result<(), SchemaError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?;

    if !matches!(found, Some(v) if v >= EXPECTED_SCHEMA_VERSION) {
        return Err(SchemaError::Outdated {
            found,
            expected: EXPECTED_SCHEMA_VERSION,
        });
    }

    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name::text, column_name::text FROM information_schema.columns
         WHERE table_schema = current_schema()",
    )
    .fetch_all(pool)
    .await?;
    let present: HashSet<(String, String)> = rows.into_iter().collect();

    missing_column(&present).map_or(Ok(()), |(table, column)| {
        Err(SchemaError::MissingColumn { table, column })
    })
}

fn missing_column(present: &HashSet<(String, String)>) -> Option<(&'static str, &'static str)> {
    REQUIRED_COLUMNS
        .iter()
        .find(|(table, column)| !present.contains(&(table.to_string(), column.to_string())))
        .copied()
}
