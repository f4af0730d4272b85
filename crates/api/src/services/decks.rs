//! Deck orchestration: validation policy, ownership, listing enrichment and
//! duplication on top of the [`Store`].

use std::sync::Arc;

use decklab_core::deck::{CardSlot, DeckEntry, DeckZones, Zone, ZoneCounts};
use decklab_core::error::CoreError;
use decklab_core::search::{Page, PageRequest};
use decklab_core::types::DbId;
use decklab_core::validation::deck::{validate_deck, validate_zones, DeckValidation};
use decklab_db::models::deck::{
    CreateDeck, Deck, DeckSummary, DeckWithCards, PreviewCard, UpdateDeck,
};
use decklab_db::store::{Store, StoreResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::ValidationPolicy;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Number of cards shown on a deck tile in the owner's listing.
pub const PREVIEW_SIZE: i64 = 5;

/// Marker attached to listing entries whose details could not be loaded.
pub const DEGRADED_MARKER: &str = "Failed to load deck details";

/// Largest quantity the `deck_cards.quantity` column can hold.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// One card of a create request. Zone defaults to main, quantity to one.
#[derive(Debug, Clone, Deserialize)]
pub struct DeckCardInput {
    pub card_id: DbId,
    #[serde(default, alias = "deck_type")]
    pub zone: Option<Zone>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl DeckCardInput {
    fn to_entry(&self) -> DeckEntry {
        DeckEntry {
            card_id: self.card_id,
            zone: self.zone.unwrap_or_default(),
            quantity: CardSlot {
                card_id: self.card_id,
                quantity: self.quantity,
            }
            .copies(),
        }
    }
}

/// Request body for `POST /decks`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeckRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub cards: Vec<DeckCardInput>,
}

/// Request body for `PUT /decks/{id}`: a full replacement.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDeckRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub main_deck: Vec<CardSlot>,
    #[serde(default)]
    pub extra_deck: Vec<CardSlot>,
    #[serde(default)]
    pub side_deck: Vec<CardSlot>,
}

/// Request body for `POST /decks/validate`.
#[derive(Debug, Default, Deserialize)]
pub struct ValidateDeckRequest {
    #[serde(default)]
    pub main_deck: Vec<CardSlot>,
    #[serde(default)]
    pub extra_deck: Vec<CardSlot>,
    #[serde(default)]
    pub side_deck: Vec<CardSlot>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A written deck, plus the validation report when running in report mode.
#[derive(Debug, Clone, Serialize)]
pub struct DeckWrite<T> {
    pub deck: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<DeckValidation>,
}

/// A deck tile in the owner's listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckOverview {
    #[serde(flatten)]
    pub deck: Deck,
    pub card_count: i64,
    pub main_count: i64,
    pub extra_count: i64,
    pub side_count: i64,
    pub preview_cards: Vec<PreviewCard>,
}

impl DeckOverview {
    fn new(deck: Deck, counts: ZoneCounts, preview_cards: Vec<PreviewCard>) -> Self {
        Self {
            deck,
            card_count: counts.total(),
            main_count: counts.main,
            extra_count: counts.extra,
            side_count: counts.side,
            preview_cards,
        }
    }
}

/// One entry of the owner's listing. A deck whose details failed to load is
/// still listed, with zero counts and an `error` marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeckListing {
    Ready(DeckOverview),
    Degraded {
        #[serde(flatten)]
        overview: DeckOverview,
        error: &'static str,
    },
}

impl DeckListing {
    fn degraded(deck: Deck) -> Self {
        DeckListing::Degraded {
            overview: DeckOverview::new(deck, ZoneCounts::default(), Vec::new()),
            error: DEGRADED_MARKER,
        }
    }

    pub fn overview(&self) -> &DeckOverview {
        match self {
            DeckListing::Ready(overview) | DeckListing::Degraded { overview, .. } => overview,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, DeckListing::Degraded { .. })
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Deck use cases. Cheap to construct per request.
#[derive(Clone)]
pub struct DeckService {
    store: Arc<dyn Store>,
    policy: ValidationPolicy,
}

impl DeckService {
    pub fn new(store: Arc<dyn Store>, policy: ValidationPolicy) -> Self {
        Self { store, policy }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(Arc::clone(&state.store), state.config.deck_validation)
    }

    /// Create a deck with all its cards in one write.
    pub async fn create_deck(
        &self,
        user_id: DbId,
        input: CreateDeckRequest,
    ) -> AppResult<DeckWrite<Deck>> {
        check_request(&input)?;
        let name = required_name(&input.name)?;

        let entries: Vec<DeckEntry> = input.cards.iter().map(DeckCardInput::to_entry).collect();
        check_quantities(&entries)?;
        let validation = self.apply_policy(&DeckZones::from_entries(&entries))?;

        let deck = self
            .store
            .create_deck(
                &CreateDeck {
                    user_id,
                    name,
                    description: input.description.unwrap_or_default(),
                },
                &entries,
            )
            .await?;

        tracing::info!(deck_id = deck.id, user_id, cards = entries.len(), "Deck created");
        Ok(DeckWrite { deck, validation })
    }

    /// A deck with its cards organised by zone.
    pub async fn get_deck(&self, id: DbId) -> AppResult<DeckWithCards> {
        let deck = self
            .store
            .find_deck(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Deck", id })?;
        let cards = self.store.list_deck_cards(id).await?;
        Ok(DeckWithCards::organize(deck, cards))
    }

    /// Replace name, description and every card of an owned deck.
    pub async fn update_deck(
        &self,
        user_id: DbId,
        id: DbId,
        input: UpdateDeckRequest,
    ) -> AppResult<DeckWrite<DeckWithCards>> {
        check_request(&input)?;
        let name = required_name(&input.name)?;

        let zones = DeckZones {
            main: input.main_deck,
            extra: input.extra_deck,
            side: input.side_deck,
        };
        let entries = zones.to_entries();
        check_quantities(&entries)?;
        let validation = self.apply_policy(&zones)?;

        let deck = self
            .store
            .replace_deck(
                id,
                user_id,
                &UpdateDeck {
                    name,
                    description: input.description.unwrap_or_default(),
                },
                &entries,
            )
            .await?
            .ok_or(CoreError::DeckNotFound { id })?;

        tracing::info!(deck_id = id, user_id, cards = entries.len(), "Deck replaced");
        // The replace is already committed here.
        let cards = match self.store.list_deck_cards(id).await {
            Ok(cards) => cards,
            Err(err) => {
                tracing::warn!(
                    deck_id = id,
                    error = %err,
                    "Reloading replaced deck failed, returning empty zones"
                );
                Vec::new()
            }
        };
        Ok(DeckWrite {
            deck: DeckWithCards::organize(deck, cards),
            validation,
        })
    }

    /// Delete an owned deck and its cards.
    pub async fn delete_deck(&self, user_id: DbId, id: DbId) -> AppResult<()> {
        if !self.store.delete_deck(id, user_id).await? {
            return Err(CoreError::DeckNotFound { id }.into());
        }
        tracing::info!(deck_id = id, user_id, "Deck deleted");
        Ok(())
    }

    /// Every deck of `user_id` with counts and a preview, newest first.
    ///
    /// Decks are enriched concurrently. A deck whose enrichment fails is
    /// returned as [`DeckListing::Degraded`]; the rest of the batch is
    /// unaffected.
    pub async fn list_user_decks(&self, user_id: DbId) -> AppResult<Vec<DeckListing>> {
        let decks = self.store.list_decks_by_owner(user_id).await?;
        let listings = join_all(decks.into_iter().map(|deck| self.enrich(deck))).await;

        let degraded = listings.iter().filter(|l| l.is_degraded()).count();
        tracing::debug!(user_id, decks = listings.len(), degraded, "Listed user decks");
        Ok(listings)
    }

    /// Copy any deck, with all its cards, into a new deck owned by `user_id`.
    pub async fn duplicate_deck(
        &self,
        user_id: DbId,
        id: DbId,
        new_name: Option<String>,
    ) -> AppResult<Deck> {
        let source = self
            .store
            .find_deck(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Deck", id })?;
        let entries = self.store.list_deck_entries(id).await?;

        let name = new_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{} (copy)", source.name));

        let copy = self
            .store
            .create_deck(
                &CreateDeck {
                    user_id,
                    name,
                    description: source.description.clone(),
                },
                &entries,
            )
            .await?;

        tracing::info!(source_id = id, deck_id = copy.id, user_id, "Deck duplicated");
        Ok(copy)
    }

    /// Dry-run the validator without touching storage.
    pub fn validate_deck(&self, input: &ValidateDeckRequest) -> DeckValidation {
        validate_deck(&input.main_deck, &input.extra_deck, &input.side_deck)
    }

    /// One page of all decks with per-zone counts, newest first.
    pub async fn list_public_decks(&self, request: PageRequest) -> AppResult<Page<DeckSummary>> {
        let decks = self
            .store
            .list_deck_summaries(request.limit, request.offset())
            .await?;
        let total = self.store.count_decks().await?;
        Ok(Page::new(decks, request, total))
    }

    // -- private helpers --

    fn apply_policy(&self, zones: &DeckZones) -> AppResult<Option<DeckValidation>> {
        let report = validate_zones(zones);
        match self.policy {
            ValidationPolicy::Enforce if !report.is_valid => {
                tracing::debug!(errors = ?report.errors, "Rejected invalid deck");
                Err(CoreError::InvalidDeck(report).into())
            }
            ValidationPolicy::Enforce => Ok(None),
            ValidationPolicy::Report => Ok(Some(report)),
        }
    }

    async fn enrich(&self, deck: Deck) -> DeckListing {
        match self.overview(&deck).await {
            Ok(overview) => DeckListing::Ready(overview),
            Err(err) => {
                tracing::warn!(deck_id = deck.id, error = %err, "Returning degraded deck listing");
                DeckListing::degraded(deck)
            }
        }
    }

    async fn overview(&self, deck: &Deck) -> StoreResult<DeckOverview> {
        let counts = match self.store.zone_counts(deck.id).await {
            Ok(counts) => counts,
            Err(err) => {
                tracing::warn!(deck_id = deck.id, error = %err, "Per-zone count failed, using total");
                ZoneCounts {
                    main: self.store.total_card_count(deck.id).await?,
                    ..ZoneCounts::default()
                }
            }
        };
        let preview = self.store.preview_cards(deck.id, PREVIEW_SIZE).await?;
        Ok(DeckOverview::new(deck.clone(), counts, preview))
    }
}

fn check_request(input: &impl Validate) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))
}

fn check_quantities(entries: &[DeckEntry]) -> AppResult<()> {
    match entries.iter().find(|e| e.quantity > MAX_QUANTITY) {
        Some(entry) => Err(CoreError::Validation(format!(
            "Quantity of card {} must be at most {MAX_QUANTITY}",
            entry.card_id
        ))
        .into()),
        None => Ok(()),
    }
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Deck name must not be blank".into()).into());
    }
    Ok(name.to_string())
}
