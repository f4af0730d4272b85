use sqlx::PgPool;

/// Full bootstrap: connect, migrate, verify schema.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    decklab_db::health_check(&pool).await.unwrap();
    decklab_db::schema::verify_schema(&pool).await.unwrap();

    let tables = [
        "cards",
        "card_sets",
        "card_images",
        "card_prices",
        "decks",
        "deck_cards",
        "sessions",
    ];
    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// A dropped column is caught by the startup check.
#[sqlx::test(migrations = "./migrations")]
async fn test_verify_schema_reports_missing_column(pool: PgPool) {
    sqlx::query("ALTER TABLE sessions DROP COLUMN expires_at")
        .execute(&pool)
        .await
        .unwrap();

    let err = decklab_db::schema::verify_schema(&pool).await.unwrap_err();
    assert!(
        matches!(
            err,
            decklab_db::schema::SchemaError::MissingColumn {
                table: "sessions",
                column: "expires_at"
            }
        ),
        "unexpected error: {err}"
    );
}

/// The zone and quantity constraints are enforced by storage.
#[sqlx::test(migrations = "./migrations")]
async fn test_deck_card_constraints(pool: PgPool) {
    sqlx::query("INSERT INTO cards (id, name, card_type) VALUES (1, 'Probe', 'Spell Card')")
        .execute(&pool)
        .await
        .unwrap();
    let deck_id: i64 =
        sqlx::query_scalar("INSERT INTO decks (user_id, name) VALUES (1, 'd') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();

    let bad_zone = sqlx::query(
        "INSERT INTO deck_cards (deck_id, card_id, zone, quantity) VALUES ($1, 1, 'hand', 1)",
    )
    .bind(deck_id)
    .execute(&pool)
    .await;
    assert!(bad_zone.is_err(), "unknown zone must be rejected");

    let zero_quantity = sqlx::query(
        "INSERT INTO deck_cards (deck_id, card_id, zone, quantity) VALUES ($1, 1, 'main', 0)",
    )
    .bind(deck_id)
    .execute(&pool)
    .await;
    assert!(zero_quantity.is_err(), "quantity 0 must be rejected");
}
