//! Shared query parameter types for API handlers.

use decklab_core::search::{clamp_limit, PageRequest, DEFAULT_RANDOM_LIMIT, MAX_RANDOM_LIMIT};
use decklab_db::models::card::CardFilter;
use serde::Deserialize;

/// Page-based pagination parameters (`?page=&limit=`).
///
/// Values are clamped by [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Query parameters for `GET /cards/random`.
#[derive(Debug, Default, Deserialize)]
pub struct RandomParams {
    pub limit: Option<i64>,
}

impl RandomParams {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_RANDOM_LIMIT, MAX_RANDOM_LIMIT)
    }
}

/// Query parameters for `GET /cards`. Blank text filters are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CardSearchParams {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub race: Option<String>,
    pub attribute: Option<String>,
    pub archetype: Option<String>,
    pub level: Option<i32>,
    pub atk_min: Option<i32>,
    pub atk_max: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl CardSearchParams {
    pub fn filter(&self) -> CardFilter {
        CardFilter {
            name: non_blank(&self.name),
            card_type: non_blank(&self.card_type),
            race: non_blank(&self.race),
            attribute: non_blank(&self.attribute),
            archetype: non_blank(&self.archetype),
            level: self.level,
            atk_min: self.atk_min,
            atk_max: self.atk_max,
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        let params = CardSearchParams {
            name: Some("  ".into()),
            race: Some(" Dragon ".into()),
            ..Default::default()
        };
        let filter = params.filter();
        assert_eq!(filter.name, None);
        assert_eq!(filter.race.as_deref(), Some("Dragon"));
    }

    #[test]
    fn random_limit_is_clamped() {
        assert_eq!(RandomParams::default().limit(), 10);
        assert_eq!(RandomParams { limit: Some(500) }.limit(), 50);
    }
}
