use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use commons_core::ports::{PasswordService, TokenService, UserRepository};
use commons_infra::{Argon2PasswordService, JwtConfig, JwtTokenService, SeedData};

use super::configure_routes;
use crate::state::AppState;

const SEED: &str = r#"{
    "users": [
        { "username": "alice", "email": "alice@example.com", "password": "hunter22",
          "verified": true, "country": "nl" },
        { "username": "bob", "email": "bob@example.com", "password": "hunter22" },
        { "username": "root", "email": "root@example.com", "password": "hunter22",
          "roles": ["admin"] }
    ],
    "items": [
        {
            "id": "0b7d5a8e-1c2f-4c55-8d1e-6a3f2b9c0001",
            "kind": "how-to",
            "slug": "make-a-brick",
            "title": "Make a brick",
            "description": "From shredded plastic",
            "creator": { "id": "0b7d5a8e-1c2f-4c55-8d1e-6a3f2b9c00a1", "username": "alice" },
            "moderation": "accepted",
            "tags": ["t1", "unknown"],
            "created_at": "2024-01-01T00:00:00Z",
            "modified_at": "2024-01-01T00:00:00Z"
        },
        {
            "id": "0b7d5a8e-1c2f-4c55-8d1e-6a3f2b9c0002",
            "kind": "research",
            "slug": "solar-dryer",
            "title": "Solar dryer",
            "creator": { "id": "0b7d5a8e-1c2f-4c55-8d1e-6a3f2b9c00a1", "username": "alice" },
            "moderation": "awaiting-moderation",
            "updates": [
                { "id": "0b7d5a8e-1c2f-4c55-8d1e-6a3f2b9c0101", "title": "First", "status": "published",
                  "created_at": "2024-01-02T00:00:00Z" },
                { "id": "0b7d5a8e-1c2f-4c55-8d1e-6a3f2b9c0102", "title": "Hidden", "status": "draft",
                  "created_at": "2024-01-03T00:00:00Z" }
            ],
            "created_at": "2024-01-01T00:00:00Z",
            "modified_at": "2024-01-01T00:00:00Z"
        }
    ],
    "tags": [{ "key": "t1", "label": "plastic" }]
}"#;

struct Ctx {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl Ctx {
    async fn new() -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "commons-test".to_string(),
        }));
        let state = AppState::from_seed(SeedData::from_json(SEED).unwrap(), passwords.clone())
            .await
            .unwrap();

        Self {
            state,
            tokens,
            passwords,
        }
    }

    async fn bearer(&self, username: &str) -> (header::HeaderName, String) {
        let user = self
            .state
            .users
            .find_by_username(username)
            .await
            .unwrap()
            .unwrap();
        let roles = user.roles.iter().map(|r| r.as_str().to_string()).collect();
        let token = self
            .tokens
            .generate_token(user.id, &user.username, roles)
            .unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .app_data(web::Data::new($ctx.tokens.clone()))
                .app_data(web::Data::new($ctx.passwords.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_ok() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn found_howto_returns_view() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/how-to/make-a-brick")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let data = &body["data"];
    assert_eq!(data["state"], "found");
    assert_eq!(data["slug"], "make-a-brick");
    assert_eq!(data["tag_list"], json!([{ "key": "t1", "label": "plastic", "image": null }]));
    assert_eq!(data["author"]["is_verified"], true);
    assert_eq!(data["is_editable"], false);
}

#[actix_web::test]
async fn missing_howto_returns_search_redirect() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/how-to/make-a-chair")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["state"], "not_found");
    assert_eq!(body["data"]["redirect"]["search"], "make a chair");
    assert_eq!(body["data"]["redirect"]["source"], "how-to-not-found");
    assert_eq!(
        body["data"]["redirect"]["location"],
        "/how-to/?search=make+a+chair&source=how-to-not-found"
    );
}

#[actix_web::test]
async fn missing_research_has_no_redirect() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/research/make-a-chair")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"].get("redirect").is_none());
}

#[actix_web::test]
async fn research_view_lists_public_updates_only() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/research/solar-dryer?fragment=%23update-0")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let updates = body["data"]["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["title"], "First");
    assert_eq!(updates[0]["show_comments"], true);
    assert_eq!(body["data"]["updates_count"], 1);
}

#[actix_web::test]
async fn useful_vote_requires_token() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/how-to/make-a-brick/useful")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn useful_vote_toggles() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);
    let auth = ctx.bearer("bob").await;

    let req = test::TestRequest::post()
        .uri("/api/how-to/make-a-brick/useful")
        .insert_header(auth.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["has_user_voted_useful"], true);
    assert_eq!(body["data"]["stats"]["voted_useful"], 1);

    let req = test::TestRequest::post()
        .uri("/api/how-to/make-a-brick/useful")
        .insert_header(auth)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["has_user_voted_useful"], false);
    assert_eq!(body["data"]["stats"]["voted_useful"], 0);
}

#[actix_web::test]
async fn follow_on_missing_article_is_not_found() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/research/nowhere/follow")
        .insert_header(ctx.bearer("bob").await)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn follow_subscribes_viewer() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/research/solar-dryer/follow")
        .insert_header(ctx.bearer("bob").await)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["has_user_subscribed"], true);
    assert_eq!(body["data"]["stats"]["subscribers"], 1);
}

#[actix_web::test]
async fn moderation_is_admin_only() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/research/solar-dryer/moderation")
        .insert_header(ctx.bearer("alice").await)
        .set_json(json!({ "accepted": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/research/solar-dryer/moderation")
        .insert_header(ctx.bearer("root").await)
        .set_json(json!({ "accepted": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["moderation"], "accepted");
    assert_eq!(body["data"]["needs_moderation"], false);

    let req = test::TestRequest::post()
        .uri("/api/research/solar-dryer/moderation")
        .insert_header(ctx.bearer("root").await)
        .set_json(json!({ "accepted": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn howto_has_no_moderation_route() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/how-to/make-a-brick/moderation")
        .insert_header(ctx.bearer("root").await)
        .set_json(json!({ "accepted": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn sign_up_then_login() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .set_json(json!({
            "display_name": "Jack Maker",
            "email": "jack@example.com",
            "password": "hunter22",
            "confirm_password": "hunter22",
            "consent": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["username"], "jackmaker");
    assert_eq!(body["data"]["redirect"], "/sign-up-message");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "jack@example.com", "password": "hunter22" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["username"], "jackmaker");
}

#[actix_web::test]
async fn sign_up_reports_every_invalid_field() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .set_json(json!({
            "display_name": "J",
            "email": "nope",
            "password": "hunter22",
            "confirm_password": "hunter23"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Unprocessable Entity");
    let detail = body["detail"].as_str().unwrap();
    for field in ["display_name", "email", "confirm_password", "consent"] {
        assert!(detail.contains(field), "{field} missing from {detail}");
    }
}

#[actix_web::test]
async fn sign_up_with_taken_username_conflicts() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .set_json(json!({
            "display_name": "Alice",
            "email": "alice2@example.com",
            "password": "hunter22",
            "confirm_password": "hunter22",
            "consent": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Sorry, that username already exists");
}

#[actix_web::test]
async fn signed_in_sign_up_redirects_home() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .insert_header(ctx.bearer("bob").await)
        .set_json(json!({
            "display_name": "",
            "email": "",
            "password": "",
            "confirm_password": ""
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["redirect"], "/");
    assert!(body["data"].get("user").is_none());
}

#[actix_web::test]
async fn login_rejects_wrong_password() {
    let ctx = Ctx::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "bob@example.com", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
