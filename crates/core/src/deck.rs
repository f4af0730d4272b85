//! Deck building blocks: zones, card slots and per-zone counts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Quantity assumed for a card slot that does not specify one.
pub const DEFAULT_QUANTITY: u32 = 1;

/// One of the three partitions of a deck.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    #[default]
    Main,
    Extra,
    Side,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Main, Zone::Extra, Zone::Side];

    /// The value stored in the `deck_cards.zone` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Main => "main",
            Zone::Extra => "extra",
            Zone::Side => "side",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown deck zone '{0}' (expected main, extra or side)")]
pub struct ParseZoneError(pub String);

impl FromStr for Zone {
    type Err = ParseZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Zone::Main),
            "extra" => Ok(Zone::Extra),
            "side" => Ok(Zone::Side),
            other => Err(ParseZoneError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Zone {
    type Error = ParseZoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A card reference inside one zone, as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSlot {
    pub card_id: DbId,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl CardSlot {
    pub fn new(card_id: DbId, quantity: u32) -> Self {
        Self {
            card_id,
            quantity: Some(quantity),
        }
    }

    /// Number of copies this slot contributes. Missing or zero quantities
    /// count as one copy.
    pub fn copies(&self) -> u32 {
        match self.quantity {
            Some(q) if q > 0 => q,
            _ => DEFAULT_QUANTITY,
        }
    }
}

/// A normalized deck-card row ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card_id: DbId,
    pub zone: Zone,
    pub quantity: u32,
}

/// The three zones of a deck as lists of card slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckZones {
    #[serde(default)]
    pub main: Vec<CardSlot>,
    #[serde(default)]
    pub extra: Vec<CardSlot>,
    #[serde(default)]
    pub side: Vec<CardSlot>,
}

impl DeckZones {
    /// Group a flat list of entries by zone, keeping submission order.
    pub fn from_entries(entries: &[DeckEntry]) -> Self {
        let mut zones = Self::default();
        for entry in entries {
            zones
                .zone_mut(entry.zone)
                .push(CardSlot::new(entry.card_id, entry.quantity));
        }
        zones
    }

    pub fn zone(&self, zone: Zone) -> &[CardSlot] {
        match zone {
            Zone::Main => &self.main,
            Zone::Extra => &self.extra,
            Zone::Side => &self.side,
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut Vec<CardSlot> {
        match zone {
            Zone::Main => &mut self.main,
            Zone::Extra => &mut self.extra,
            Zone::Side => &mut self.side,
        }
    }

    /// Flatten into normalized entries (main, then extra, then side).
    pub fn to_entries(&self) -> Vec<DeckEntry> {
        Zone::ALL
            .into_iter()
            .flat_map(|zone| {
                self.zone(zone).iter().map(move |slot| DeckEntry {
                    card_id: slot.card_id,
                    zone,
                    quantity: slot.copies(),
                })
            })
            .collect()
    }
}

/// Card totals per zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub main: i64,
    pub extra: i64,
    pub side: i64,
}

impl ZoneCounts {
    pub fn total(&self) -> i64 {
        self.main + self.extra + self.side
    }

    pub fn add(&mut self, zone: Zone, amount: i64) {
        match zone {
            Zone::Main => self.main += amount,
            Zone::Extra => self.extra += amount,
            Zone::Side => self.side += amount,
        }
    }
}
