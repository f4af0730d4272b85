//! Card catalog models.
//!
//! The catalog is populated by an external import job; this service only
//! reads it (the `NewCard*` DTOs exist for fixtures and tests).

use decklab_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `cards` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Card {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub frame_type: Option<String>,
    pub description: Option<String>,
    pub race: Option<String>,
    pub attribute: Option<String>,
    pub archetype: Option<String>,
    pub level: Option<i32>,
    pub atk: Option<i32>,
    pub def: Option<i32>,
}

/// A card with its first image, as returned by search and browse endpoints.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CardSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub card: Card,
    pub image_url: Option<String>,
    pub image_url_small: Option<String>,
}

/// A printing of a card in a set.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CardSet {
    pub set_name: String,
    pub set_code: String,
    pub set_rarity: Option<String>,
    pub set_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CardImage {
    pub image_url: String,
    pub image_url_small: Option<String>,
    pub image_url_cropped: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CardPrice {
    pub cardmarket_price: Option<f64>,
    pub tcgplayer_price: Option<f64>,
    pub ebay_price: Option<f64>,
}

/// A card with every set, image and price row attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDetail {
    #[serde(flatten)]
    pub card: Card,
    pub card_sets: Vec<CardSet>,
    pub card_images: Vec<CardImage>,
    pub card_prices: Vec<CardPrice>,
}

/// Search filters. Every `Some` field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    /// Case-insensitive substring of the card name.
    pub name: Option<String>,
    pub card_type: Option<String>,
    pub race: Option<String>,
    pub attribute: Option<String>,
    pub archetype: Option<String>,
    pub level: Option<i32>,
    pub atk_min: Option<i32>,
    pub atk_max: Option<i32>,
}

impl CardFilter {
    /// In-process equivalent of the SQL `WHERE` clause built by `CardRepo`.
    pub fn matches(&self, card: &Card) -> bool {
        fn eq(filter: &Option<String>, value: &Option<String>) -> bool {
            filter.is_none() || filter.as_deref() == value.as_deref()
        }

        if let Some(name) = &self.name {
            if !card.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(card_type) = &self.card_type {
            if &card.card_type != card_type {
                return false;
            }
        }
        if self.level.is_some() && self.level != card.level {
            return false;
        }
        if let Some(min) = self.atk_min {
            if !card.atk.is_some_and(|atk| atk >= min) {
                return false;
            }
        }
        if let Some(max) = self.atk_max {
            if !card.atk.is_some_and(|atk| atk <= max) {
                return false;
            }
        }
        eq(&self.race, &card.race)
            && eq(&self.attribute, &card.attribute)
            && eq(&self.archetype, &card.archetype)
    }
}

/// DTO for inserting a catalog card.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub card: Card,
    pub sets: Vec<CardSet>,
    pub images: Vec<CardImage>,
    pub prices: Vec<CardPrice>,
}
