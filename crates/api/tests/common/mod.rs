#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use decklab_api::config::{Environment, LogFormat, ServerConfig, ValidationPolicy};
use decklab_api::router::build_app_router;
use decklab_api::state::AppState;
use decklab_db::models::card::{Card, CardImage, CardPrice, CardSet, NewCard};
use decklab_db::models::session::CreateSession;
use decklab_db::store::MemoryStore;

/// Token of the primary test user (id [`USER_ID`]).
pub const TOKEN: &str = "test-token-alice";
pub const USER_ID: i64 = 1;

/// Token of a second user (id [`OTHER_USER_ID`]).
pub const OTHER_TOKEN: &str = "test-token-bob";
pub const OTHER_USER_ID: i64 = 2;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        environment: Environment::Test,
        deck_validation: ValidationPolicy::Enforce,
        database_max_connections: 1,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over `store` with the production
/// middleware stack.
pub fn build_app_with(store: Arc<MemoryStore>, config: ServerConfig) -> Router {
    let state = AppState::new(store, config.clone());
    build_app_router(state, &config)
}

pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    build_app_with(store, test_config())
}

/// A store with two users' sessions and cards `1..=30` in the catalog.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (token, user_id) in [(TOKEN, USER_ID), (OTHER_TOKEN, OTHER_USER_ID)] {
        store
            .insert_session(CreateSession {
                token: token.to_string(),
                user_id,
                expires_at: None,
            })
            .await;
    }
    for id in 1..=30 {
        store.insert_card(sample_card(id)).await;
    }
    store
}

/// Catalog card `id`: even ids are Spellcasters, odd ids Warriors. Ids
/// up to 10 are printed in `LOB`, the rest in `MRD`.
pub fn sample_card(id: i64) -> NewCard {
    let race = if id % 2 == 0 { "Spellcaster" } else { "Warrior" };
    let set_code = if id <= 10 {
        format!("LOB-EN{id:03}")
    } else {
        format!("MRD-EN{id:03}")
    };
    NewCard {
        card: Card {
            id,
            name: format!("Card {id:02}"),
            card_type: "Effect Monster".to_string(),
            frame_type: Some("effect".to_string()),
            description: Some("Test card".to_string()),
            race: Some(race.to_string()),
            attribute: Some("DARK".to_string()),
            archetype: None,
            level: Some(4),
            atk: Some(i32::try_from(id).unwrap() * 100),
            def: Some(1000),
        },
        sets: vec![CardSet {
            set_name: "Test Set".to_string(),
            set_code,
            set_rarity: Some("Common".to_string()),
            set_price: Some(0.5),
        }],
        images: vec![CardImage {
            image_url: format!("https://images.example/{id}.jpg"),
            image_url_small: Some(format!("https://images.example/{id}_small.jpg")),
            image_url_cropped: None,
        }],
        prices: vec![CardPrice {
            cardmarket_price: Some(0.1),
            tcgplayer_price: None,
            ebay_price: None,
        }],
    }
}

/// `total` main-deck cards over ids starting at `first_id`, three copies each.
pub fn main_slots(first_id: i64, total: u32) -> Vec<Value> {
    let mut slots = Vec::new();
    let mut remaining = total;
    let mut id = first_id;
    while remaining > 0 {
        let quantity = remaining.min(3);
        slots.push(json!({ "card_id": id, "quantity": quantity }));
        remaining -= quantity;
        id += 1;
    }
    slots
}

/// Create body for a legal 40-card deck.
pub fn legal_create_body(name: &str) -> Value {
    json!({ "name": name, "description": "test deck", "cards": main_slots(1, 40) })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(&body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(&body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(&body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a legal deck as `token`'s owner and return its id.
pub async fn create_deck(app: Router, name: &str, token: &str) -> i64 {
    let response = post_json_auth(app, "/api/v1/decks", legal_create_body(name), token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["deck"]["id"].as_i64().unwrap()
}
