//! Route definitions for the `/cards` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::cards;
use crate::state::AppState;

/// Routes mounted at `/cards`.
///
/// ```text
/// GET /                    -> search_cards (?name=&type=&race=&attribute=&archetype=&level=&atk_min=&atk_max=&page=&limit=)
/// GET /random              -> random_cards (?limit=)
/// GET /sets/{set_code}     -> cards_by_set
/// GET /{id}                -> get_card
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cards::search_cards))
        .route("/random", get(cards::random_cards))
        .route("/sets/{set_code}", get(cards::cards_by_set))
        .route("/{id}", get(cards::get_card))
}
