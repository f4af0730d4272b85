//! In-process implementation of the storage traits.
//!
//! Mirrors the observable behaviour of [`PgStore`](super::PgStore): ordering,
//! ownership checks, foreign keys on card ids and session expiry. Also lets a
//! test make per-deck reads fail, to exercise degraded listings.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use decklab_core::deck::{DeckEntry, ZoneCounts};
use decklab_core::types::DbId;
use rand::seq::IteratorRandom;
use tokio::sync::RwLock;

use crate::models::card::{Card, CardDetail, CardFilter, CardSummary, NewCard};
use crate::models::deck::{
    CreateDeck, Deck, DeckCardDetail, DeckSummary, PreviewCard, UpdateDeck,
};
use crate::models::session::{CreateSession, Session};
use crate::store::{CardStore, DeckStore, SessionStore, Store, StoreError, StoreResult};

#[derive(Debug, thiserror::Error)]
enum MemoryError {
    #[error("card {0} does not exist")]
    UnknownCard(DbId),
    #[error("quantity {0} does not fit the quantity column")]
    QuantityOutOfRange(u32),
    #[error("injected failure for deck {0}")]
    Injected(DbId),
}

#[derive(Debug, Clone)]
struct DeckCardRow {
    deck_id: DbId,
    entry: DeckEntry,
}

#[derive(Debug, Default)]
struct State {
    sessions: Vec<Session>,
    decks: BTreeMap<DbId, Deck>,
    deck_cards: Vec<DeckCardRow>,
    cards: BTreeMap<DbId, NewCard>,
    failing_decks: HashSet<DbId>,
    failing_zone_counts: HashSet<DbId>,
    next_session_id: DbId,
    next_deck_id: DbId,
}

impl State {
    fn next_id(counter: &mut DbId) -> DbId {
        *counter += 1;
        *counter
    }

    /// Same checks the `deck_cards` foreign key and column types apply.
    fn check_entries(&self, entries: &[DeckEntry]) -> Result<(), MemoryError> {
        for entry in entries {
            if !self.cards.contains_key(&entry.card_id) {
                return Err(MemoryError::UnknownCard(entry.card_id));
            }
            if i32::try_from(entry.quantity).is_err() {
                return Err(MemoryError::QuantityOutOfRange(entry.quantity));
            }
        }
        Ok(())
    }

    fn insert_entries(&mut self, deck_id: DbId, entries: &[DeckEntry]) {
        for entry in entries {
            self.deck_cards.push(DeckCardRow {
                deck_id,
                entry: *entry,
            });
        }
    }

    fn rows(&self, deck_id: DbId) -> impl Iterator<Item = &DeckCardRow> {
        self.deck_cards.iter().filter(move |row| row.deck_id == deck_id)
    }

    fn owned(&self, id: DbId, user_id: DbId) -> bool {
        self.decks.get(&id).is_some_and(|deck| deck.user_id == user_id)
    }

    fn zone_counts(&self, deck_id: DbId) -> ZoneCounts {
        let mut counts = ZoneCounts::default();
        for row in self.rows(deck_id) {
            counts.add(row.entry.zone, i64::from(row.entry.quantity));
        }
        counts
    }

    fn ensure_readable(&self, deck_id: DbId) -> Result<(), MemoryError> {
        if self.failing_decks.contains(&deck_id) {
            return Err(MemoryError::Injected(deck_id));
        }
        Ok(())
    }

    fn summary(&self, card: &NewCard) -> CardSummary {
        let image = card.images.first();
        CardSummary {
            card: card.card.clone(),
            image_url: image.map(|i| i.image_url.clone()),
            image_url_small: image.and_then(|i| i.image_url_small.clone()),
        }
    }
}

fn by_name(a: &CardSummary, b: &CardSummary) -> std::cmp::Ordering {
    a.card
        .name
        .cmp(&b.card.name)
        .then(a.card.id.cmp(&b.card.id))
}

fn newest_first(a: &Deck, b: &Deck) -> std::cmp::Ordering {
    b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id))
}

/// Storage held entirely in memory behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, as the identity service would.
    pub async fn insert_session(&self, input: CreateSession) -> Session {
        let mut state = self.state.write().await;
        let session = Session {
            id: State::next_id(&mut state.next_session_id),
            token: input.token,
            user_id: input.user_id,
            created_at: Utc::now(),
            expires_at: input.expires_at,
        };
        state.sessions.push(session.clone());
        session
    }

    /// Add a catalog card with its sets, images and prices. Replaces any card
    /// with the same id.
    pub async fn insert_card(&self, input: NewCard) -> Card {
        let card = input.card.clone();
        self.state.write().await.cards.insert(card.id, input);
        card
    }

    /// Make every per-deck read for `deck_id` fail.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn fail_deck_reads(&self, deck_id: DbId) {
        self.state.write().await.failing_decks.insert(deck_id);
    }

    /// Make only the per-zone count for `deck_id` fail.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn fail_zone_counts(&self, deck_id: DbId) {
        self.state.write().await.failing_zone_counts.insert(deck_id);
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find_session_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let now = Utc::now();
        let state = self.state.read().await;
        Ok(state
            .sessions
            .iter()
            .find(|s| s.token == token && !s.is_expired_at(now))
            .cloned())
    }

    async fn revoke_session(&self, token: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.token != token);
        Ok(state.sessions.len() < before)
    }

    async fn revoke_user_sessions(&self, user_id: DbId) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl DeckStore for MemoryStore {
    async fn create_deck(&self, input: &CreateDeck, entries: &[DeckEntry]) -> StoreResult<Deck> {
        let mut state = self.state.write().await;
        state
            .check_entries(entries)
            .map_err(|e| StoreError::new("failed to create deck", e))?;

        let now = Utc::now();
        let deck = Deck {
            id: State::next_id(&mut state.next_deck_id),
            user_id: input.user_id,
            name: input.name.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        state.decks.insert(deck.id, deck.clone());
        state.insert_entries(deck.id, entries);
        Ok(deck)
    }

    async fn find_deck(&self, id: DbId) -> StoreResult<Option<Deck>> {
        Ok(self.state.read().await.decks.get(&id).cloned())
    }

    async fn list_decks_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Deck>> {
        let state = self.state.read().await;
        let mut decks: Vec<Deck> = state
            .decks
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        decks.sort_by(newest_first);
        Ok(decks)
    }

    async fn list_deck_summaries(&self, limit: i64, offset: i64) -> StoreResult<Vec<DeckSummary>> {
        let state = self.state.read().await;
        let mut decks: Vec<&Deck> = state.decks.values().collect();
        decks.sort_by(|a, b| newest_first(a, b));
        Ok(decks
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|deck| DeckSummary::new(deck.clone(), state.zone_counts(deck.id)))
            .collect())
    }

    async fn count_decks(&self) -> StoreResult<i64> {
        Ok(self.state.read().await.decks.len() as i64)
    }

    async fn list_deck_entries(&self, deck_id: DbId) -> StoreResult<Vec<DeckEntry>> {
        let state = self.state.read().await;
        state
            .ensure_readable(deck_id)
            .map_err(|e| StoreError::new("failed to load deck cards", e))?;
        Ok(state.rows(deck_id).map(|row| row.entry).collect())
    }

    async fn list_deck_cards(&self, deck_id: DbId) -> StoreResult<Vec<DeckCardDetail>> {
        const CONTEXT: &str = "failed to load deck cards";

        let state = self.state.read().await;
        state
            .ensure_readable(deck_id)
            .map_err(|e| StoreError::new(CONTEXT, e))?;
        state
            .rows(deck_id)
            .filter_map(|row| Some((row, state.cards.get(&row.entry.card_id)?)))
            .map(|(row, card)| {
                let summary = state.summary(card);
                Ok(DeckCardDetail {
                    card: summary.card,
                    zone: row.entry.zone,
                    quantity: i32::try_from(row.entry.quantity)
                        .map_err(|e| StoreError::new(CONTEXT, e))?,
                    image_url: summary.image_url,
                    image_url_small: summary.image_url_small,
                })
            })
            .collect()
    }

    async fn zone_counts(&self, deck_id: DbId) -> StoreResult<ZoneCounts> {
        const CONTEXT: &str = "failed to count deck cards by zone";

        let state = self.state.read().await;
        state
            .ensure_readable(deck_id)
            .map_err(|e| StoreError::new(CONTEXT, e))?;
        if state.failing_zone_counts.contains(&deck_id) {
            return Err(StoreError::new(CONTEXT, MemoryError::Injected(deck_id)));
        }
        Ok(state.zone_counts(deck_id))
    }

    async fn total_card_count(&self, deck_id: DbId) -> StoreResult<i64> {
        let state = self.state.read().await;
        state
            .ensure_readable(deck_id)
            .map_err(|e| StoreError::new("failed to count deck cards", e))?;
        Ok(state.zone_counts(deck_id).total())
    }

    async fn preview_cards(&self, deck_id: DbId, limit: i64) -> StoreResult<Vec<PreviewCard>> {
        let state = self.state.read().await;
        state
            .ensure_readable(deck_id)
            .map_err(|e| StoreError::new("failed to load deck preview", e))?;
        Ok(state
            .rows(deck_id)
            .filter_map(|row| {
                let card = state.cards.get(&row.entry.card_id)?;
                Some(PreviewCard {
                    id: card.card.id,
                    name: card.card.name.clone(),
                    card_type: card.card.card_type.clone(),
                    zone: row.entry.zone,
                    image: card.images.first().and_then(|i| i.image_url_small.clone()),
                })
            })
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn replace_deck(
        &self,
        id: DbId,
        user_id: DbId,
        input: &UpdateDeck,
        entries: &[DeckEntry],
    ) -> StoreResult<Option<Deck>> {
        let mut state = self.state.write().await;
        if !state.owned(id, user_id) {
            return Ok(None);
        }
        state
            .check_entries(entries)
            .map_err(|e| StoreError::new("failed to update deck", e))?;

        state.deck_cards.retain(|row| row.deck_id != id);
        state.insert_entries(id, entries);

        let Some(deck) = state.decks.get_mut(&id) else {
            return Ok(None);
        };
        deck.name = input.name.clone();
        deck.description = input.description.clone();
        deck.updated_at = Utc::now();
        Ok(Some(deck.clone()))
    }

    async fn delete_deck(&self, id: DbId, user_id: DbId) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if !state.owned(id, user_id) {
            return Ok(false);
        }
        state.deck_cards.retain(|row| row.deck_id != id);
        Ok(state.decks.remove(&id).is_some())
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn search_cards(
        &self,
        filter: &CardFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<CardSummary>, i64)> {
        let state = self.state.read().await;
        let mut matches: Vec<CardSummary> = state
            .cards
            .values()
            .filter(|c| filter.matches(&c.card))
            .map(|c| state.summary(c))
            .collect();
        matches.sort_by(by_name);

        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok((page, total))
    }

    async fn find_card(&self, id: DbId) -> StoreResult<Option<CardDetail>> {
        let state = self.state.read().await;
        Ok(state.cards.get(&id).map(|c| CardDetail {
            card: c.card.clone(),
            card_sets: c.sets.clone(),
            card_images: c.images.clone(),
            card_prices: c.prices.clone(),
        }))
    }

    async fn random_cards(&self, limit: i64) -> StoreResult<Vec<CardSummary>> {
        let state = self.state.read().await;
        let amount = usize::try_from(limit).unwrap_or(0);
        Ok(state
            .cards
            .values()
            .choose_multiple(&mut rand::rng(), amount)
            .into_iter()
            .map(|c| state.summary(c))
            .collect())
    }

    async fn cards_by_set(&self, set_code: &str) -> StoreResult<Vec<CardSummary>> {
        let needle = set_code.to_lowercase();
        let state = self.state.read().await;
        let mut cards: Vec<CardSummary> = state
            .cards
            .values()
            .filter(|c| {
                c.sets
                    .iter()
                    .any(|s| s.set_code.to_lowercase().contains(&needle))
            })
            .map(|c| state.summary(c))
            .collect();
        cards.sort_by(by_name);
        Ok(cards)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
