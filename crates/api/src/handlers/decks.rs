//! Handlers for the `/decks` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use decklab_core::search::Page;
use decklab_core::types::DbId;
use decklab_core::validation::deck::DeckValidation;
use decklab_db::models::deck::{Deck, DeckSummary, DeckWithCards};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::services::decks::{
    CreateDeckRequest, DeckListing, DeckWrite, UpdateDeckRequest, ValidateDeckRequest,
};
use crate::services::DeckService;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /decks/{id}/duplicate`.
#[derive(Debug, Default, Deserialize)]
pub struct DuplicateDeckRequest {
    #[serde(default, alias = "newName")]
    pub new_name: Option<String>,
}

/// `{ "deck": ... }` payload used by read endpoints.
#[derive(Debug, Serialize)]
pub struct DeckPayload<T> {
    pub deck: T,
}

/// Payload returned after a delete.
#[derive(Debug, Serialize)]
pub struct DeletedDeck {
    pub id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/decks
///
/// Create a deck with its cards for the authenticated user.
pub async fn create_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<CreateDeckRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DeckWrite<Deck>>>)> {
    let written = DeckService::from_state(&state)
        .create_deck(user.user_id, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(written).with_message("Deck created successfully")),
    ))
}

/// GET /api/v1/decks
///
/// The authenticated user's decks with counts and previews.
pub async fn list_user_decks(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<DeckListing>>>> {
    let listings = DeckService::from_state(&state)
        .list_user_decks(user.user_id)
        .await?;
    let message = if listings.is_empty() {
        "No decks found for user"
    } else {
        "Decks retrieved successfully"
    };
    Ok(Json(ApiResponse::list(listings).with_message(message)))
}

/// GET /api/v1/decks/public
pub async fn list_public_decks(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> AppResult<Json<ApiResponse<Page<DeckSummary>>>> {
    let page = DeckService::from_state(&state)
        .list_public_decks(params.to_request())
        .await?;
    Ok(Json(ApiResponse::new(page)))
}

/// POST /api/v1/decks/validate
///
/// Dry-run the construction rules. Always 200; the verdict is in the body.
pub async fn validate_deck(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ValidateDeckRequest>,
) -> Json<ApiResponse<DeckValidation>> {
    let report = DeckService::from_state(&state).validate_deck(&input);
    Json(ApiResponse::new(report))
}

/// GET /api/v1/decks/{id}
pub async fn get_deck(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<DeckPayload<DeckWithCards>>>> {
    let deck = DeckService::from_state(&state).get_deck(id).await?;
    Ok(Json(ApiResponse::new(DeckPayload { deck })))
}

/// PUT /api/v1/decks/{id}
///
/// Replace the deck's name, description and all three zones.
pub async fn update_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateDeckRequest>,
) -> AppResult<Json<ApiResponse<DeckWrite<DeckWithCards>>>> {
    let written = DeckService::from_state(&state)
        .update_deck(user.user_id, id, input)
        .await?;
    Ok(Json(
        ApiResponse::new(written).with_message("Deck updated successfully"),
    ))
}

/// DELETE /api/v1/decks/{id}
pub async fn delete_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<DeletedDeck>>> {
    DeckService::from_state(&state)
        .delete_deck(user.user_id, id)
        .await?;
    Ok(Json(
        ApiResponse::new(DeletedDeck { id }).with_message("Deck deleted successfully"),
    ))
}

/// POST /api/v1/decks/{id}/duplicate
///
/// Copy any deck into a new one owned by the caller.
pub async fn duplicate_deck(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
    body: Result<Json<DuplicateDeckRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<DeckPayload<Deck>>>)> {
    // The body is optional; only a request that sends one must send valid JSON.
    let input = match body {
        Ok(Json(input)) => input,
        Err(JsonRejection::MissingJsonContentType(_)) => DuplicateDeckRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let deck = DeckService::from_state(&state)
        .duplicate_deck(user.user_id, id, input.new_name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(DeckPayload { deck }).with_message("Deck duplicated successfully")),
    ))
}
