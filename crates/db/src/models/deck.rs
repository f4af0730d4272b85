//! Deck and deck-card models.

use decklab_core::deck::{DeckEntry, ParseZoneError, Zone, ZoneCounts, DEFAULT_QUANTITY};
use decklab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::card::Card;

/// A row from the `decks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Deck {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a deck.
#[derive(Debug, Clone)]
pub struct CreateDeck {
    pub user_id: DbId,
    pub name: String,
    pub description: String,
}

/// DTO for the scalar part of a full deck replacement.
#[derive(Debug, Clone)]
pub struct UpdateDeck {
    pub name: String,
    pub description: String,
}

/// A deck-card row joined with its catalog card and first image.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DeckCardDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub card: Card,
    #[sqlx(try_from = "String")]
    pub zone: Zone,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub image_url_small: Option<String>,
}

/// A deck with its cards organised by zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckWithCards {
    #[serde(flatten)]
    pub deck: Deck,
    pub main: Vec<DeckCardDetail>,
    pub extra: Vec<DeckCardDetail>,
    pub side: Vec<DeckCardDetail>,
}

impl DeckWithCards {
    /// Split joined rows into their zones, keeping row order within a zone.
    pub fn organize(deck: Deck, cards: Vec<DeckCardDetail>) -> Self {
        let mut organized = Self {
            deck,
            main: Vec::new(),
            extra: Vec::new(),
            side: Vec::new(),
        };
        for card in cards {
            match card.zone {
                Zone::Main => organized.main.push(card),
                Zone::Extra => organized.extra.push(card),
                Zone::Side => organized.side.push(card),
            }
        }
        organized
    }
}

/// Up to five cards shown on a deck tile in listings.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PreviewCard {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    #[sqlx(try_from = "String")]
    pub zone: Zone,
    pub image: Option<String>,
}

/// A deck with aggregate per-zone counts, used by the public listing.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DeckSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub deck: Deck,
    pub main_count: i64,
    pub extra_count: i64,
    pub side_count: i64,
    pub card_count: i64,
}

impl DeckSummary {
    pub fn new(deck: Deck, counts: ZoneCounts) -> Self {
        Self {
            deck,
            main_count: counts.main,
            extra_count: counts.extra,
            side_count: counts.side,
            card_count: counts.total(),
        }
    }
}

/// Raw `(card_id, zone, quantity)` triple read back for duplication.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct DeckEntryRow {
    pub card_id: DbId,
    pub zone: String,
    pub quantity: i32,
}

impl DeckEntryRow {
    pub fn into_entry(self) -> Result<DeckEntry, ParseZoneError> {
        Ok(DeckEntry {
            card_id: self.card_id,
            zone: self.zone.parse()?,
            quantity: u32::try_from(self.quantity).unwrap_or(DEFAULT_QUANTITY),
        })
    }
}
