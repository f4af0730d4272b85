pub mod auth;
pub mod cards;
pub mod decks;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/logout                 revoke current session (requires auth)
/// /auth/logout-all             revoke every session of the user (requires auth)
///
/// /decks                       list own (auth), create (auth)
/// /decks/public                paginated listing of all decks
/// /decks/validate              dry-run validation
/// /decks/{id}                  get, replace (auth), delete (auth)
/// /decks/{id}/duplicate        copy into caller's decks (auth)
///
/// /cards                       search
/// /cards/random                random sample
/// /cards/sets/{set_code}       cards printed in a set
/// /cards/{id}                  card with sets, images and prices
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/decks", decks::router())
        .nest("/cards", cards::router())
}
