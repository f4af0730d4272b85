//! Deck validator: zone size bounds and the per-card copy limit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::deck::{CardSlot, DeckZones, ZoneCounts};
use crate::types::DbId;

pub const MAIN_DECK_MIN: i64 = 40;
pub const MAIN_DECK_MAX: i64 = 60;
pub const EXTRA_DECK_MAX: i64 = 15;
pub const SIDE_DECK_MAX: i64 = 15;

/// Maximum aggregate copies of one card id across all zones of a deck.
pub const COPY_LIMIT: i64 = 3;

/// Outcome of validating a deck. `counts` is filled in even when invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub counts: ZoneCounts,
}

/// Validate the three zones of a deck.
///
/// Rules are checked in a fixed order and every violation is reported:
/// main size, extra size, side size, then copy limit (one error per
/// offending card id, ascending by id).
pub fn validate_deck(main: &[CardSlot], extra: &[CardSlot], side: &[CardSlot]) -> DeckValidation {
    let counts = ZoneCounts {
        main: zone_total(main),
        extra: zone_total(extra),
        side: zone_total(side),
    };

    let mut errors = Vec::new();

    if counts.main < MAIN_DECK_MIN {
        errors.push(format!(
            "Main deck must contain at least {MAIN_DECK_MIN} cards (found {})",
            counts.main
        ));
    }
    if counts.main > MAIN_DECK_MAX {
        errors.push(format!(
            "Main deck cannot contain more than {MAIN_DECK_MAX} cards (found {})",
            counts.main
        ));
    }
    if counts.extra > EXTRA_DECK_MAX {
        errors.push(format!(
            "Extra deck cannot contain more than {EXTRA_DECK_MAX} cards (found {})",
            counts.extra
        ));
    }
    if counts.side > SIDE_DECK_MAX {
        errors.push(format!(
            "Side deck cannot contain more than {SIDE_DECK_MAX} cards (found {})",
            counts.side
        ));
    }

    let mut copies: BTreeMap<DbId, i64> = BTreeMap::new();
    for slot in main.iter().chain(extra).chain(side) {
        *copies.entry(slot.card_id).or_default() += i64::from(slot.copies());
    }
    for (card_id, count) in copies {
        if count > COPY_LIMIT {
            errors.push(format!(
                "Card with id {card_id} exceeds the limit of {COPY_LIMIT} copies (found {count})"
            ));
        }
    }

    DeckValidation {
        is_valid: errors.is_empty(),
        errors,
        counts,
    }
}

/// Convenience wrapper over [`validate_deck`] for a grouped deck.
pub fn validate_zones(zones: &DeckZones) -> DeckValidation {
    validate_deck(&zones.main, &zones.extra, &zones.side)
}

fn zone_total(slots: &[CardSlot]) -> i64 {
    slots.iter().map(|slot| i64::from(slot.copies())).sum()
}
