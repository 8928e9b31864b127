//! HTTP-level tests: the router is served on an ephemeral port over the
//! in-memory stores and driven with reqwest.

use std::sync::Arc;

use common::{
    auth::{Claims, RevocationList, TokenType},
    cache::{RedisConfig, RedisPool},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;
use wardrobe::{MemoryBlobStore, MemoryWardrobeStore};

use crate::{middleware::JwtVerifier, routes::create_router, state::AppState};

const PRIVATE_KEY: &str = include_str!("../../../fixtures/jwt/test_private.pem");
const PUBLIC_KEY: &str = include_str!("../../../fixtures/jwt/test_public.pem");

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    store: MemoryWardrobeStore,
    blobs: MemoryBlobStore,
}

impl TestApp {
    async fn spawn() -> Self {
        Self::spawn_with_revocations(None).await
    }

    async fn spawn_with_revocations(revocations: Option<RevocationList>) -> Self {
        let store = MemoryWardrobeStore::new();
        let blobs = MemoryBlobStore::new();
        let jwt = JwtVerifier::from_public_pem(PUBLIC_KEY).unwrap();
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(blobs.clone()),
            jwt,
            revocations,
            1024 * 1024,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            store,
            blobs,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_collection(&self, token: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url("/api/users/createCollection"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get_json(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn delete(&self, token: &str, path: &str) -> StatusCode {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
            .status()
    }

    async fn upload(&self, token: &str, name: &str, category: &str, mime: &str) -> (StatusCode, Value) {
        let image = Part::bytes(vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a])
            .file_name(format!("{name}.bin"))
            .mime_str(mime)
            .unwrap();
        let form = Form::new()
            .text("clothing_name", name.to_string())
            .text("category", category.to_string())
            .part("image", image);

        let response = self
            .client
            .post(self.url("/api/users/addClothing"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

fn claims_for(user_id: Uuid, exp_offset: i64) -> Claims {
    let now = chrono::Utc::now().timestamp();
    Claims {
        sub: user_id,
        username: Some("tester".into()),
        jti: Uuid::new_v4(),
        iat: now as u64,
        exp: (now + exp_offset) as u64,
        token_type: TokenType::Access,
    }
}

fn sign(claims: &Claims) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        claims,
        &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}

fn token_with_expiry(user_id: Uuid, exp_offset: i64) -> String {
    sign(&claims_for(user_id, exp_offset))
}

fn token_for(user_id: Uuid) -> String {
    token_with_expiry(user_id, 3600)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_reject_bad_credentials() {
    let app = TestApp::spawn().await;
    let user = app.store.add_user().await;

    let hs256 = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({"sub": user, "jti": Uuid::new_v4(), "iat": 0, "exp": u32::MAX, "token_type": "Access"}),
        &EncodingKey::from_secret(b"not-the-key"),
    )
    .unwrap();

    let no_header = app
        .client
        .get(app.url("/api/users/getCollections"))
        .send()
        .await
        .unwrap();
    assert_eq!(no_header.status(), StatusCode::UNAUTHORIZED);

    let wrong_scheme = app
        .client
        .get(app.url("/api/users/getCollections"))
        .header("Authorization", format!("Token {}", token_for(user)))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_scheme.status(), StatusCode::UNAUTHORIZED);

    for token in [
        "garbage".to_string(),
        token_with_expiry(user, -3600),
        hs256,
    ] {
        let (status, body) = app.get_json(&token, "/api/users/getCollections").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn collection_lifecycle_over_http() {
    let app = TestApp::spawn().await;
    let user = app.store.add_user().await;
    let token = token_for(user);
    let (i1, i2, i3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let (status, body) = app
        .create_collection(&token, json!({"collection_name": "Summer", "item_ids": [i1, i2]}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "created");
    assert_eq!(body["collection"]["item_ids"], json!([i1, i2]));
    let collection_id = body["collection"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .create_collection(&token, json!({"collection_name": "Summer", "item_ids": [i2, i3]}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "merged");
    assert_eq!(body["collection"]["item_ids"], json!([i1, i2, i3]));

    let (status, body) = app
        .create_collection(&token, json!({"collection_name": "Summer", "clothing_id": i1}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no-op");

    let (status, body) = app.get_json(&token, "/api/users/getCollections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Summer");
    assert_eq!(body[0]["items"], json!([null, null, null]));

    let path = format!("/api/users/deleteCollection/{}", collection_id);
    assert_eq!(app.delete(&token, &path).await, StatusCode::OK);
    assert_eq!(app.delete(&token, &path).await, StatusCode::NOT_FOUND);

    let (_, body) = app.get_json(&token, "/api/users/getCollections").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_collection_requests_are_bad_requests() {
    let app = TestApp::spawn().await;
    let user = app.store.add_user().await;
    let token = token_for(user);

    let (status, body) = app
        .create_collection(&token, json!({"collection_name": "Gym", "item_ids": ["nope"]}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("nope"));

    let (status, body) = app
        .create_collection(&token, json!({"collection_name": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Collection name is required");

    let response = app
        .client
        .post(app.url("/api/users/createCollection"))
        .bearer_auth(&token)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.store.all_collections().await.is_empty());
}

#[tokio::test]
async fn unknown_owner_must_reauthenticate() {
    let app = TestApp::spawn().await;
    let token = token_for(Uuid::new_v4());

    let (status, body) = app
        .create_collection(&token, json!({"collection_name": "Ghost"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Owner not found");
}

#[tokio::test]
async fn other_users_collections_are_not_found() {
    let app = TestApp::spawn().await;
    let (owner, intruder) = (app.store.add_user().await, app.store.add_user().await);

    let (_, body) = app
        .create_collection(&token_for(owner), json!({"collection_name": "Mine"}))
        .await;
    let path = format!(
        "/api/users/deleteCollection/{}",
        body["collection"]["id"].as_str().unwrap()
    );

    assert_eq!(
        app.delete(&token_for(intruder), &path).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete(&token_for(intruder), "/api/users/deleteCollection/not-a-uuid")
            .await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.store.all_collections().await.len(), 1);
}

#[tokio::test]
async fn clothing_upload_listing_and_deletion() {
    let app = TestApp::spawn().await;
    let (owner, intruder) = (app.store.add_user().await, app.store.add_user().await);
    let token = token_for(owner);

    let (status, item) = app.upload(&token, "Linen shirt", "Top", "image/png").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["clothing_name"], "Linen shirt");
    assert_eq!(item["category"], "Top");
    let item_id = item["id"].as_str().unwrap().to_string();
    assert!(item["image"].as_str().unwrap().ends_with(&format!("{}.png", item_id)));
    assert_eq!(app.blobs.len().await, 1);

    let (status, tops) = app.get_json(&token, "/api/users/getClothing?category=Top").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tops.as_array().unwrap().len(), 1);

    let (_, shoes) = app.get_json(&token, "/api/users/getClothing?category=Shoes").await;
    assert_eq!(shoes, json!([]));

    let (status, _) = app.get_json(&token, "/api/users/getClothing?category=Hats").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_collection(&token, json!({"collection_name": "Beach", "item_ids": [item_id]}))
        .await;
    let (_, collections) = app.get_json(&token, "/api/users/getCollections").await;
    assert_eq!(collections[0]["items"][0]["id"], item_id.as_str());

    let path = format!("/api/users/deleteClothing/{}", item_id);
    assert_eq!(app.delete(&token_for(intruder), &path).await, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&token, &path).await, StatusCode::OK);
    assert!(app.blobs.is_empty().await);

    let (_, collections) = app.get_json(&token, "/api/users/getCollections").await;
    assert_eq!(collections[0]["items"], json!([null]));
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app.store.add_user().await;

    let (status, body) = app
        .upload(&token_for(user), "Notes", "Top", "application/pdf")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unsupported image type"));
    assert!(app.blobs.is_empty().await);
}

async fn revocations_at(url: &str) -> RevocationList {
    let redis = RedisPool::new(&RedisConfig {
        url: url.to_string(),
    })
    .await
    .unwrap();
    RevocationList::new(redis)
}

#[tokio::test]
async fn revocation_lookup_failure_is_a_server_error() {
    let app =
        TestApp::spawn_with_revocations(Some(revocations_at("redis://127.0.0.1:1").await)).await;
    let user = app.store.add_user().await;

    let (status, body) = app
        .get_json(&token_for(user), "/api/users/getCollections")
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn revoked_tokens_are_rejected() {
    let url = RedisConfig::from_env().unwrap().url;
    let revocations = revocations_at(&url).await;
    let app = TestApp::spawn_with_revocations(Some(revocations.clone())).await;
    let user = app.store.add_user().await;

    let revoked = claims_for(user, 3600);
    let live = claims_for(user, 3600);
    revocations.revoke(&revoked.jti, 60).await.unwrap();

    let (status, body) = app.get_json(&sign(&revoked), "/api/users/getCollections").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = app.get_json(&sign(&live), "/api/users/getCollections").await;
    assert_eq!(status, StatusCode::OK);
}
