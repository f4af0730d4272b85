//! PostgreSQL implementation of the storage traits, delegating to the
//! repositories.

use async_trait::async_trait;
use decklab_core::deck::{DeckEntry, ZoneCounts};
use decklab_core::types::DbId;

use crate::models::card::{CardDetail, CardFilter, CardSummary};
use crate::models::deck::{CreateDeck, Deck, DeckCardDetail, DeckSummary, PreviewCard, UpdateDeck};
use crate::models::session::Session;
use crate::repositories::{CardRepo, DeckCardRepo, DeckRepo, SessionRepo};
use crate::store::{CardStore, DeckStore, SessionStore, Store, StoreContext, StoreResult};
use crate::DbPool;

/// Storage backed by a sqlx connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn find_session_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        SessionRepo::find_active_by_token(&self.pool, token)
            .await
            .context("failed to look up session")
    }

    async fn revoke_session(&self, token: &str) -> StoreResult<bool> {
        SessionRepo::delete_by_token(&self.pool, token)
            .await
            .context("failed to revoke session")
    }

    async fn revoke_user_sessions(&self, user_id: DbId) -> StoreResult<u64> {
        SessionRepo::delete_all_for_user(&self.pool, user_id)
            .await
            .context("failed to revoke user sessions")
    }
}

#[async_trait]
impl DeckStore for PgStore {
    async fn create_deck(&self, input: &CreateDeck, entries: &[DeckEntry]) -> StoreResult<Deck> {
        const CONTEXT: &str = "failed to create deck";

        let mut tx = self.pool.begin().await.context(CONTEXT)?;
        let deck = DeckRepo::create(&mut *tx, input).await.context(CONTEXT)?;
        DeckCardRepo::insert_many(&mut *tx, deck.id, entries)
            .await
            .context(CONTEXT)?;
        tx.commit().await.context(CONTEXT)?;

        tracing::debug!(deck_id = deck.id, cards = entries.len(), "Deck rows inserted");
        Ok(deck)
    }

    async fn find_deck(&self, id: DbId) -> StoreResult<Option<Deck>> {
        DeckRepo::find_by_id(&self.pool, id)
            .await
            .context("failed to load deck")
    }

    async fn list_decks_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Deck>> {
        DeckRepo::list_by_user(&self.pool, user_id)
            .await
            .context("failed to list user decks")
    }

    async fn list_deck_summaries(&self, limit: i64, offset: i64) -> StoreResult<Vec<DeckSummary>> {
        DeckRepo::list_summaries(&self.pool, limit, offset)
            .await
            .context("failed to list decks")
    }

    async fn count_decks(&self) -> StoreResult<i64> {
        DeckRepo::count(&self.pool)
            .await
            .context("failed to count decks")
    }

    async fn list_deck_entries(&self, deck_id: DbId) -> StoreResult<Vec<DeckEntry>> {
        DeckCardRepo::list_entries(&self.pool, deck_id)
            .await
            .context("failed to load deck cards")
    }

    async fn list_deck_cards(&self, deck_id: DbId) -> StoreResult<Vec<DeckCardDetail>> {
        DeckCardRepo::list_details(&self.pool, deck_id)
            .await
            .context("failed to load deck cards")
    }

    async fn zone_counts(&self, deck_id: DbId) -> StoreResult<ZoneCounts> {
        DeckCardRepo::zone_counts(&self.pool, deck_id)
            .await
            .context("failed to count deck cards by zone")
    }

    async fn total_card_count(&self, deck_id: DbId) -> StoreResult<i64> {
        DeckCardRepo::total_quantity(&self.pool, deck_id)
            .await
            .context("failed to count deck cards")
    }

    async fn preview_cards(&self, deck_id: DbId, limit: i64) -> StoreResult<Vec<PreviewCard>> {
        DeckCardRepo::preview(&self.pool, deck_id, limit)
            .await
            .context("failed to load deck preview")
    }

    async fn replace_deck(
        &self,
        id: DbId,
        user_id: DbId,
        input: &UpdateDeck,
        entries: &[DeckEntry],
    ) -> StoreResult<Option<Deck>> {
        const CONTEXT: &str = "failed to update deck";

        let mut tx = self.pool.begin().await.context(CONTEXT)?;
        if DeckRepo::lock_owned(&mut *tx, id, user_id)
            .await
            .context(CONTEXT)?
            .is_none()
        {
            return Ok(None);
        }

        let deck = DeckRepo::update(&mut *tx, id, input).await.context(CONTEXT)?;
        let removed = DeckCardRepo::delete_by_deck(&mut *tx, id)
            .await
            .context(CONTEXT)?;
        let inserted = DeckCardRepo::insert_many(&mut *tx, id, entries)
            .await
            .context(CONTEXT)?;
        tx.commit().await.context(CONTEXT)?;

        tracing::debug!(deck_id = id, removed, inserted, "Deck rows replaced");
        Ok(Some(deck))
    }

    async fn delete_deck(&self, id: DbId, user_id: DbId) -> StoreResult<bool> {
        const CONTEXT: &str = "failed to delete deck";

        let mut tx = self.pool.begin().await.context(CONTEXT)?;
        if DeckRepo::lock_owned(&mut *tx, id, user_id)
            .await
            .context(CONTEXT)?
            .is_none()
        {
            return Ok(false);
        }

        DeckCardRepo::delete_by_deck(&mut *tx, id)
            .await
            .context(CONTEXT)?;
        let deleted = DeckRepo::delete(&mut *tx, id).await.context(CONTEXT)?;
        tx.commit().await.context(CONTEXT)?;
        Ok(deleted)
    }
}

#[async_trait]
impl CardStore for PgStore {
    async fn search_cards(
        &self,
        filter: &CardFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<CardSummary>, i64)> {
        const CONTEXT: &str = "failed to search cards";

        let cards = CardRepo::search(&self.pool, filter, limit, offset)
            .await
            .context(CONTEXT)?;
        let total = CardRepo::count(&self.pool, filter).await.context(CONTEXT)?;
        Ok((cards, total))
    }

    async fn find_card(&self, id: DbId) -> StoreResult<Option<CardDetail>> {
        const CONTEXT: &str = "failed to load card";

        let Some(card) = CardRepo::find_by_id(&self.pool, id).await.context(CONTEXT)? else {
            return Ok(None);
        };
        let card_sets = CardRepo::list_sets(&self.pool, id).await.context(CONTEXT)?;
        let card_images = CardRepo::list_images(&self.pool, id).await.context(CONTEXT)?;
        let card_prices = CardRepo::list_prices(&self.pool, id).await.context(CONTEXT)?;

        Ok(Some(CardDetail {
            card,
            card_sets,
            card_images,
            card_prices,
        }))
    }

    async fn random_cards(&self, limit: i64) -> StoreResult<Vec<CardSummary>> {
        CardRepo::random(&self.pool, limit)
            .await
            .context("failed to sample random cards")
    }

    async fn cards_by_set(&self, set_code: &str) -> StoreResult<Vec<CardSummary>> {
        CardRepo::list_by_set_code(&self.pool, set_code)
            .await
            .context("failed to load cards for set")
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool)
            .await
            .context("database is unreachable")
    }
}
