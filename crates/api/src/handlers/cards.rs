//! Handlers for the `/cards` catalog endpoints. All public.

use axum::extract::State;
use axum::Json;
use decklab_core::error::CoreError;
use decklab_core::search::Page;
use decklab_core::types::DbId;
use decklab_db::models::card::{CardDetail, CardSummary};

use crate::error::AppResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::query::{CardSearchParams, RandomParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/cards
///
/// Filtered, name-ordered, paginated card search.
pub async fn search_cards(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CardSearchParams>,
) -> AppResult<Json<ApiResponse<Page<CardSummary>>>> {
    let request = params.page();
    let (cards, total) = state
        .store
        .search_cards(&params.filter(), request.limit, request.offset())
        .await?;
    Ok(Json(ApiResponse::new(Page::new(cards, request, total))))
}

/// GET /api/v1/cards/{id}
pub async fn get_card(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<CardDetail>>> {
    let card = state
        .store
        .find_card(id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Card", id })?;
    Ok(Json(ApiResponse::new(card)))
}

/// GET /api/v1/cards/random
pub async fn random_cards(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RandomParams>,
) -> AppResult<Json<ApiResponse<Vec<CardSummary>>>> {
    let cards = state.store.random_cards(params.limit()).await?;
    Ok(Json(ApiResponse::list(cards)))
}

/// GET /api/v1/cards/sets/{set_code}
pub async fn cards_by_set(
    State(state): State<AppState>,
    ApiPath(set_code): ApiPath<String>,
) -> AppResult<Json<ApiResponse<Vec<CardSummary>>>> {
    let cards = state.store.cards_by_set(&set_code).await?;
    Ok(Json(ApiResponse::list(cards)))
}
