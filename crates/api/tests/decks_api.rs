//! Integration tests for the `/api/v1/decks` resource.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_deck, delete_auth, get, get_auth, main_slots, post_json, post_json_auth,
    put_json_auth, OTHER_TOKEN, OTHER_USER_ID, TOKEN, USER_ID,
};
use decklab_api::config::ValidationPolicy;
use decklab_db::store::DeckStore;
use serde_json::json;

// ---------------------------------------------------------------------------
// Create / get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_and_deck_is_readable_by_zone() {
    let app = common::build_test_app(common::seeded_store().await);
    let body = json!({
        "name": "  Dark Magicians  ",
        "cards": [
            { "card_id": 1, "quantity": 3 },
            { "card_id": 2, "zone": "main", "quantity": 3 },
            { "card_id": 3, "deck_type": "main", "quantity": 3 },
            { "card_id": 4, "quantity": 3 },
            { "card_id": 5, "quantity": 3 },
            { "card_id": 6, "quantity": 3 },
            { "card_id": 7, "quantity": 3 },
            { "card_id": 8, "quantity": 3 },
            { "card_id": 9, "quantity": 3 },
            { "card_id": 10, "quantity": 3 },
            { "card_id": 11, "quantity": 3 },
            { "card_id": 12, "quantity": 3 },
            { "card_id": 13, "quantity": 3 },
            { "card_id": 14 },
            { "card_id": 20, "zone": "extra", "quantity": 2 },
            { "card_id": 21, "zone": "side" }
        ]
    });

    let response = post_json_auth(app.clone(), "/api/v1/decks", body, TOKEN).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Deck created successfully");
    assert_eq!(json["data"]["deck"]["name"], "Dark Magicians");
    assert_eq!(json["data"]["deck"]["user_id"], USER_ID);
    assert_eq!(json["data"]["deck"]["description"], "");
    assert!(json["data"].get("validation").is_none());
    let id = json["data"]["deck"]["id"].as_i64().unwrap();

    let response = get(app, &format!("/api/v1/decks/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let deck = &json["data"]["deck"];
    assert_eq!(deck["id"], id);
    assert_eq!(deck["main"].as_array().unwrap().len(), 14);
    assert_eq!(deck["extra"][0]["id"], 20);
    assert_eq!(deck["extra"][0]["quantity"], 2);
    assert_eq!(deck["side"][0]["id"], 21);
    assert_eq!(deck["side"][0]["quantity"], 1);
    assert_eq!(deck["main"][0]["image_url"], "https://images.example/1.jpg");
}

#[tokio::test]
async fn create_requires_authentication() {
    let app = common::build_test_app(common::seeded_store().await);
    let response = post_json(app, "/api/v1/decks", common::legal_create_body("x")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_unknown_deck_is_404() {
    let app = common::build_test_app(common::seeded_store().await);
    let response = get(app, "/api/v1/decks/999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "Deck with id 999 not found");
}

#[tokio::test]
async fn create_with_blank_name_is_400() {
    let app = common::build_test_app(common::seeded_store().await);
    let body = json!({ "name": "   ", "cards": main_slots(1, 40) });
    let response = post_json_auth(app, "/api/v1/decks", body, TOKEN).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_with_unknown_card_fails_without_leaving_a_deck() {
    let app = common::build_test_app(common::seeded_store().await);
    let mut cards = main_slots(1, 39);
    cards.push(json!({ "card_id": 9999 }));
    let body = json!({ "name": "Broken", "cards": cards });

    let response = post_json_auth(app.clone(), "/api/v1/decks", body, TOKEN).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "STORAGE_ERROR");
    assert_eq!(json["message"], "Failed to create deck");

    let json = body_json(get_auth(app, "/api/v1/decks", TOKEN).await).await;
    assert_eq!(json["count"], 0);
}

// ---------------------------------------------------------------------------
// Validation policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_deck_is_422_under_enforce() {
    let app = common::build_test_app(common::seeded_store().await);
    let mut cards = main_slots(1, 39);
    cards.push(json!({ "card_id": 1, "zone": "side", "quantity": 1 }));
    let body = json!({ "name": "Too small", "cards": cards });

    let response = post_json_auth(app, "/api/v1/decks", body, TOKEN).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "INVALID_DECK");
    assert_eq!(
        json["errors"],
        json!([
            "Main deck must contain at least 40 cards (found 39)",
            "Card with id 1 exceeds the limit of 3 copies (found 4)"
        ])
    );
    assert_eq!(json["counts"], json!({ "main": 39, "extra": 0, "side": 1 }));
}

#[tokio::test]
async fn invalid_deck_is_saved_with_report_under_report_policy() {
    let mut config = common::test_config();
    config.deck_validation = ValidationPolicy::Report;
    let app = common::build_app_with(common::seeded_store().await, config);

    let body = json!({ "name": "Draft", "cards": main_slots(1, 10) });
    let response = post_json_auth(app, "/api/v1/decks", body, TOKEN).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let validation = &json["data"]["validation"];
    assert_eq!(validation["is_valid"], false);
    assert_eq!(validation["counts"]["main"], 10);
    assert_eq!(validation["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn validate_is_a_public_dry_run() {
    let store = common::seeded_store().await;
    let app = common::build_test_app(store.clone());

    let body = json!({
        "main_deck": main_slots(1, 61),
        "extra_deck": main_slots(100, 16),
        "side_deck": [],
    });
    let response = post_json(app.clone(), "/api/v1/decks/validate", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["is_valid"], false);
    assert_eq!(
        json["data"]["errors"],
        json!([
            "Main deck cannot contain more than 60 cards (found 61)",
            "Extra deck cannot contain more than 15 cards (found 16)"
        ])
    );

    let response = post_json(
        app,
        "/api/v1/decks/validate",
        json!({ "main_deck": main_slots(1, 40) }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_valid"], true);
    assert_eq!(json["data"]["errors"], json!([]));
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_replaces_every_zone() {
    let app = common::build_test_app(common::seeded_store().await);
    let id = create_deck(app.clone(), "Original", TOKEN).await;

    let body = json!({
        "name": "Renamed",
        "description": "now with an extra deck",
        "main_deck": main_slots(11, 42),
        "extra_deck": [{ "card_id": 30, "quantity": 2 }],
        "side_deck": [],
    });
    let response = put_json_auth(app.clone(), &format!("/api/v1/decks/{id}"), body, TOKEN).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Deck updated successfully");
    let deck = &json["data"]["deck"];
    assert_eq!(deck["name"], "Renamed");
    assert_eq!(deck["description"], "now with an extra deck");
    assert_eq!(deck["main"].as_array().unwrap().len(), 14);
    assert_eq!(deck["main"][0]["id"], 11);
    assert_eq!(deck["extra"][0]["quantity"], 2);
    assert_eq!(deck["side"], json!([]));

    let json = body_json(get(app, &format!("/api/v1/decks/{id}")).await).await;
    assert_eq!(json["data"]["deck"]["name"], "Renamed");
}

#[tokio::test]
async fn update_of_someone_elses_deck_is_404_and_leaves_it_untouched() {
    let app = common::build_test_app(common::seeded_store().await);
    let id = create_deck(app.clone(), "Alice's", TOKEN).await;

    let body = json!({ "name": "Stolen", "main_deck": main_slots(1, 40) });
    let response = put_json_auth(app.clone(), &format!("/api/v1/decks/{id}"), body, OTHER_TOKEN).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DECK_NOT_FOUND");
    assert_eq!(
        json["message"],
        "Deck not found or you do not have permission to modify it"
    );

    let json = body_json(get(app, &format!("/api/v1/decks/{id}")).await).await;
    assert_eq!(json["data"]["deck"]["name"], "Alice's");
}

#[tokio::test]
async fn update_with_invalid_deck_is_rejected_before_writing() {
    let app = common::build_test_app(common::seeded_store().await);
    let id = create_deck(app.clone(), "Keep me", TOKEN).await;

    let body = json!({ "name": "Broken", "main_deck": main_slots(1, 20) });
    let response = put_json_auth(app.clone(), &format!("/api/v1/decks/{id}"), body, TOKEN).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(get(app, &format!("/api/v1/decks/{id}")).await).await;
    assert_eq!(json["data"]["deck"]["name"], "Keep me");
    assert_eq!(json["data"]["deck"]["main"].as_array().unwrap().len(), 14);
}

#[tokio::test]
async fn delete_removes_deck_and_its_cards() {
    let store = common::seeded_store().await;
    let app = common::build_test_app(store.clone());
    let id = create_deck(app.clone(), "Doomed", TOKEN).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/decks/{id}"), TOKEN).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Deck deleted successfully");
    assert_eq!(json["data"]["id"], id);

    let response = get(app.clone(), &format!("/api/v1/decks/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &format!("/api/v1/decks/{id}"), TOKEN).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(store.list_deck_entries(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_of_someone_elses_deck_is_404() {
    let app = common::build_test_app(common::seeded_store().await);
    let id = create_deck(app.clone(), "Alice's", TOKEN).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/decks/{id}"), OTHER_TOKEN).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, &format!("/api/v1/decks/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_listing_is_newest_first_with_counts_and_preview() {
    let app = common::build_test_app(common::seeded_store().await);
    let first = create_deck(app.clone(), "First", TOKEN).await;
    let second = create_deck(app.clone(), "Second", TOKEN).await;
    create_deck(app.clone(), "Bob's", OTHER_TOKEN).await;

    let response = get_auth(app, "/api/v1/decks", TOKEN).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Decks retrieved successfully");
    assert_eq!(json["count"], 2);
    let decks = json["data"].as_array().unwrap();
    assert_eq!(decks[0]["id"], second);
    assert_eq!(decks[1]["id"], first);
    assert_eq!(decks[0]["card_count"], 40);
    assert_eq!(decks[0]["main_count"], 40);
    assert_eq!(decks[0]["extra_count"], 0);
    assert_eq!(decks[0]["preview_cards"].as_array().unwrap().len(), 5);
    assert!(decks[0].get("error").is_none());
}

#[tokio::test]
async fn empty_user_listing_has_its_own_message() {
    let app = common::build_test_app(common::seeded_store().await);
    let json = body_json(get_auth(app, "/api/v1/decks", TOKEN).await).await;

    assert_eq!(json["message"], "No decks found for user");
    assert_eq!(json["count"], 0);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn user_listing_degrades_a_failing_deck_only() {
    let store = common::seeded_store().await;
    let app = common::build_test_app(store.clone());
    let first = create_deck(app.clone(), "First", TOKEN).await;
    let middle = create_deck(app.clone(), "Middle", TOKEN).await;
    let last = create_deck(app.clone(), "Last", TOKEN).await;
    store.fail_deck_reads(middle).await;

    let response = get_auth(app, "/api/v1/decks", TOKEN).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["count"], 3);
    let decks = json["data"].as_array().unwrap();
    assert_eq!(decks[0]["id"], last);
    assert_eq!(decks[2]["id"], first);
    assert_eq!(decks[0]["card_count"], 40);

    let degraded = &decks[1];
    assert_eq!(degraded["id"], middle);
    assert_eq!(degraded["name"], "Middle");
    assert_eq!(degraded["error"], "Failed to load deck details");
    assert_eq!(degraded["card_count"], 0);
    assert_eq!(degraded["preview_cards"], json!([]));
}

#[tokio::test]
async fn user_listing_falls_back_to_total_when_zone_counts_fail() {
    let store = common::seeded_store().await;
    let app = common::build_test_app(store.clone());
    let id = create_deck(app.clone(), "Counted", TOKEN).await;
    store.fail_zone_counts(id).await;

    let json = body_json(get_auth(app, "/api/v1/decks", TOKEN).await).await;
    let deck = &json["data"][0];
    assert!(deck.get("error").is_none());
    assert_eq!(deck["card_count"], 40);
    assert_eq!(deck["main_count"], 40);
}

#[tokio::test]
async fn public_listing_is_paginated() {
    let app = common::build_test_app(common::seeded_store().await);
    for name in ["One", "Two", "Three"] {
        create_deck(app.clone(), name, TOKEN).await;
    }
    create_deck(app.clone(), "Bob's", OTHER_TOKEN).await;

    let response = get(app.clone(), "/api/v1/decks/public?page=2&limit=3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let page = &json["data"];
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["name"], "One");
    assert_eq!(page["items"][0]["main_count"], 40);
    assert_eq!(
        page["pagination"],
        json!({ "page": 2, "limit": 3, "total": 4, "pages": 2 })
    );

    let json = body_json(get(app, "/api/v1/decks/public").await).await;
    assert_eq!(json["data"]["items"][0]["user_id"], OTHER_USER_ID);
    assert_eq!(json["data"]["pagination"]["limit"], 20);
}

// ---------------------------------------------------------------------------
// Duplicate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_copies_cards_into_a_deck_owned_by_the_caller() {
    let app = common::build_test_app(common::seeded_store().await);
    let source = create_deck(app.clone(), "Original", TOKEN).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/decks/{source}/duplicate"),
        json!({}),
        OTHER_TOKEN,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Deck duplicated successfully");
    let copy = &json["data"]["deck"];
    assert_eq!(copy["name"], "Original (copy)");
    assert_eq!(copy["user_id"], OTHER_USER_ID);
    assert_eq!(copy["description"], "test deck");
    let copy_id = copy["id"].as_i64().unwrap();
    assert_ne!(copy_id, source);

    let original = body_json(get(app.clone(), &format!("/api/v1/decks/{source}")).await).await;
    let copied = body_json(get(app, &format!("/api/v1/decks/{copy_id}")).await).await;
    assert_eq!(
        original["data"]["deck"]["main"],
        copied["data"]["deck"]["main"]
    );
}

#[tokio::test]
async fn duplicate_accepts_a_new_name() {
    let app = common::build_test_app(common::seeded_store().await);
    let source = create_deck(app.clone(), "Original", TOKEN).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/decks/{source}/duplicate"),
        json!({ "newName": "Mirror" }),
        TOKEN,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["deck"]["name"], "Mirror");
    assert_eq!(json["data"]["deck"]["user_id"], USER_ID);
}

#[tokio::test]
async fn duplicate_of_unknown_deck_is_404() {
    let app = common::build_test_app(common::seeded_store().await);
    let response = common::post_auth(app, "/api/v1/decks/404/duplicate", TOKEN).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
