//! Route definitions for the `/decks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::decks;
use crate::state::AppState;

/// Routes mounted at `/decks`.
///
/// ```text
/// GET    /                  -> list_user_decks
/// POST   /                  -> create_deck
/// GET    /public            -> list_public_decks (?page=&limit=)
/// POST   /validate          -> validate_deck
/// GET    /{id}              -> get_deck
/// PUT    /{id}              -> update_deck
/// DELETE /{id}              -> delete_deck
/// POST   /{id}/duplicate    -> duplicate_deck
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(decks::list_user_decks).post(decks::create_deck))
        .route("/public", get(decks::list_public_decks))
        .route("/validate", post(decks::validate_deck))
        .route(
            "/{id}",
            get(decks::get_deck)
                .put(decks::update_deck)
                .delete(decks::delete_deck),
        )
        .route("/{id}/duplicate", post(decks::duplicate_deck))
}
