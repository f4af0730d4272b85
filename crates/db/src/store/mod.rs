//! Storage traits the API is written against.
//!
//! Handlers and services never see a connection pool; they receive an
//! `Arc<dyn Store>` through application state. [`PgStore`] is the production
//! implementation and [`MemoryStore`] a self-contained substitute for tests
//! and local experiments.

mod memory;
mod postgres;

use async_trait::async_trait;
use decklab_core::deck::{DeckEntry, ZoneCounts};
use decklab_core::types::DbId;

use crate::models::card::{CardDetail, CardFilter, CardSummary};
use crate::models::deck::{
    CreateDeck, Deck, DeckCardDetail, DeckSummary, PreviewCard, UpdateDeck,
};
use crate::models::session::Session;

pub use memory::MemoryStore;
pub use postgres::PgStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A storage failure with the operation it interrupted.
#[derive(Debug, thiserror::Error)]
#[error("{context}: {source}")]
pub struct StoreError {
    context: &'static str,
    source: BoxError,
}

impl StoreError {
    pub fn new(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            context,
            source: source.into(),
        }
    }

    /// Human-readable description of the failed operation, safe to show to
    /// clients.
    pub fn context(&self) -> &'static str {
        self.context
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Attach an operation description to a backend error.
pub trait StoreContext<T> {
    fn context(self, context: &'static str) -> StoreResult<T>;
}

impl<T, E> StoreContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: &'static str) -> StoreResult<T> {
        self.map_err(|e| StoreError::new(context, e))
    }
}

/// Bearer session lookup and revocation.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Exact-match lookup. Expired sessions are reported as absent.
    async fn find_session_by_token(&self, token: &str) -> StoreResult<Option<Session>>;

    /// Returns `true` if a session was removed.
    async fn revoke_session(&self, token: &str) -> StoreResult<bool>;

    /// Returns the number of sessions removed.
    async fn revoke_user_sessions(&self, user_id: DbId) -> StoreResult<u64>;
}

/// Decks and their card rows.
#[async_trait]
pub trait DeckStore: Send + Sync {
    /// Insert the deck and all its entries atomically.
    async fn create_deck(&self, input: &CreateDeck, entries: &[DeckEntry]) -> StoreResult<Deck>;

    async fn find_deck(&self, id: DbId) -> StoreResult<Option<Deck>>;

    /// Decks owned by `user_id`, most recently updated first.
    async fn list_decks_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Deck>>;

    /// One page of all decks with per-zone totals, most recently updated first.
    async fn list_deck_summaries(&self, limit: i64, offset: i64) -> StoreResult<Vec<DeckSummary>>;

    async fn count_decks(&self) -> StoreResult<i64>;

    /// The deck's card rows as normalized entries, in insertion order.
    async fn list_deck_entries(&self, deck_id: DbId) -> StoreResult<Vec<DeckEntry>>;

    /// The deck's card rows joined with catalog data, in insertion order.
    async fn list_deck_cards(&self, deck_id: DbId) -> StoreResult<Vec<DeckCardDetail>>;

    /// Sum of quantities per zone.
    async fn zone_counts(&self, deck_id: DbId) -> StoreResult<ZoneCounts>;

    /// Sum of quantities across zones.
    async fn total_card_count(&self, deck_id: DbId) -> StoreResult<i64>;

    /// First `limit` card rows of the deck.
    async fn preview_cards(&self, deck_id: DbId, limit: i64) -> StoreResult<Vec<PreviewCard>>;

    /// Replace name, description and every card row of a deck owned by
    /// `user_id`, atomically. `None` if the deck is absent or not owned.
    async fn replace_deck(
        &self,
        id: DbId,
        user_id: DbId,
        input: &UpdateDeck,
        entries: &[DeckEntry],
    ) -> StoreResult<Option<Deck>>;

    /// Delete a deck owned by `user_id` and its card rows, atomically.
    /// `false` if the deck is absent or not owned.
    async fn delete_deck(&self, id: DbId, user_id: DbId) -> StoreResult<bool>;
}

/// Read access to the card catalog.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// One page of matching cards plus the total match count.
    async fn search_cards(
        &self,
        filter: &CardFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<CardSummary>, i64)>;

    async fn find_card(&self, id: DbId) -> StoreResult<Option<CardDetail>>;

    async fn random_cards(&self, limit: i64) -> StoreResult<Vec<CardSummary>>;

    async fn cards_by_set(&self, set_code: &str) -> StoreResult<Vec<CardSummary>>;
}

/// Everything the API needs from storage.
#[async_trait]
pub trait Store: SessionStore + DeckStore + CardStore {
    /// Cheap reachability check for the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}
