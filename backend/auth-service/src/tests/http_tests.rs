/// HTTP-level tests: routing, middleware, status codes and response bodies
use actix_web::body::to_bytes;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderMap;
use actix_web::{http::StatusCode, test, web, App};
use serde_json::Value;

use crate::handlers;
use crate::models::Role;
use crate::tests::fixtures::*;

macro_rules! app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .configure(handlers::configure),
        )
        .await
    };
}

/// Status, headers and JSON body, whether the error came from a handler or
/// from the bearer middleware.
async fn outcome(result: Result<ServiceResponse, actix_web::Error>) -> (StatusCode, HeaderMap, Value) {
    let response = match result {
        Ok(resp) => resp.into_parts().1,
        Err(err) => err.error_response(),
    };
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body()).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// alice (admin) and bob (user), with an access token for each.
async fn seeded() -> (TestContext, String, String) {
    let ctx = test_context();
    ctx.state.auth_service().signup(signup_request(ALICE)).await.unwrap();
    ctx.state.auth_service().signup(signup_request(BOB)).await.unwrap();
    let alice = ctx.state.tokens.issue_access_token("alice").unwrap();
    let bob = ctx.state.tokens.issue_access_token("bob").unwrap();
    (ctx, alice, bob)
}

// ============================================================================
// /auth
// ============================================================================

#[actix_web::test]
async fn test_health() {
    let ctx = test_context();
    let app = app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_signup_created_then_conflict() {
    let ctx = test_context();
    let app = app!(ctx);
    let body = serde_json::json!({
        "username": "alice",
        "email": "alice@x.com",
        "password": "pw1"
    });

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["username"], "alice");
    assert_eq!(created["role"], "admin");
    assert!(created.get("password").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "User with the same username already exists.");
}

#[actix_web::test]
async fn test_signin_form() {
    let ctx = test_context();
    ctx.state.auth_service().signup(signup_request(BOB)).await.unwrap();
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_form([("username", "bob"), ("password", "wrong")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "Incorrect username or password");

    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_form([("username", "bob"), ("password", "pw2")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let pair: Value = test::read_body_json(resp).await;
    assert_eq!(pair["token_type"], "bearer");
    assert_eq!(
        ctx.users.snapshot("bob").unwrap().refresh_token.as_deref(),
        pair["refresh_token"].as_str()
    );
}

#[actix_web::test]
async fn test_refresh_token_endpoint() {
    let ctx = test_context();
    ctx.state.auth_service().signup(signup_request(ALICE)).await.unwrap();
    let pair = ctx.state.auth_service().signin("alice", "pw1").await.unwrap();
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/auth/refresh_token")
        .insert_header(bearer(&pair.refresh_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["refresh_token"], pair.refresh_token.as_str());

    let req = test::TestRequest::get()
        .uri("/auth/refresh_token")
        .insert_header(bearer("garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "Invalid refresh token");

    let req = test::TestRequest::get().uri("/auth/refresh_token").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Bearer middleware
// ============================================================================

#[actix_web::test]
async fn test_me_requires_token() {
    let (ctx, alice, _) = seeded().await;
    let app = app!(ctx);

    let req = test::TestRequest::get().uri("/users/me").to_request();
    let (status, headers, body) = outcome(test::try_call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key("www-authenticate"));
    assert_eq!(body["error"], "Could not validate credentials");

    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["username"], "alice");
}

#[actix_web::test]
async fn test_banned_token_rejected() {
    let (ctx, _, bob) = seeded().await;
    let admin = crate::models::Identity::from(&ctx.users.snapshot("alice").unwrap());
    let bob_id = ctx.users.snapshot("bob").unwrap().id;
    ctx.state.user_service().set_ban(&admin, bob_id, true).await.unwrap();
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&bob))
        .to_request();
    let (status, _, body) = outcome(test::try_call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "account banned");
}

#[actix_web::test]
async fn test_unknown_and_forged_tokens_look_the_same() {
    let (ctx, _, _) = seeded().await;
    let ghost = ctx.state.tokens.issue_access_token("ghost").unwrap();
    let app = app!(ctx);

    for token in [ghost.as_str(), "forged.token.value"] {
        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header(bearer(token))
            .to_request();
        let (status, _, body) = outcome(test::try_call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Could not validate credentials");
    }
}

// ============================================================================
// Role gate
// ============================================================================

#[actix_web::test]
async fn test_search_is_staff_only() {
    let (ctx, alice, bob) = seeded().await;
    let app = app!(ctx);

    let req = test::TestRequest::get()
        .uri("/users?query=bo")
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "Current user not authorized for this action");

    let req = test::TestRequest::get()
        .uri("/users?query=bo")
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let found: Value = test::read_body_json(resp).await;
    assert_eq!(found.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn test_change_role_admin_only() {
    let (ctx, alice, bob) = seeded().await;
    let bob_id = ctx.users.snapshot("bob").unwrap().id;
    let app = app!(ctx);

    let req = test::TestRequest::patch()
        .uri(&format!("/users/{bob_id}/role"))
        .insert_header(bearer(&bob))
        .set_json(serde_json::json!({ "role": "admin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/users/{bob_id}/role"))
        .insert_header(bearer(&alice))
        .set_json(serde_json::json!({ "role": "moderator" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(ctx.users.snapshot("bob").unwrap().role, Role::Moderator);
}

// ============================================================================
// Ownership gate
// ============================================================================

macro_rules! patch_image {
    ($app:expr, $token:expr, $image_id:expr) => {{
        let req = test::TestRequest::patch()
            .uri(&format!("/images/{}", $image_id))
            .insert_header(bearer($token))
            .set_json(serde_json::json!({ "description": "updated" }))
            .to_request();
        test::call_service(&$app, req).await.status()
    }};
}

#[actix_web::test]
async fn test_image_ownership() {
    // GIVEN: bob owns an image; carol is another plain user
    let (ctx, alice, bob) = seeded().await;
    ctx.state.auth_service().signup(signup_request(CAROL)).await.unwrap();
    let carol = ctx.state.tokens.issue_access_token("carol").unwrap();
    let bob_id = ctx.users.snapshot("bob").unwrap().id;
    let image = ctx.images.insert(bob_id, "sunset");
    let app = app!(ctx);

    // THEN: another user is refused and the row is untouched
    assert_eq!(patch_image!(app, &carol, image.id), StatusCode::FORBIDDEN);
    assert_eq!(
        ctx.images.get(image.id).unwrap().description.as_deref(),
        Some("sunset")
    );

    // AND: the owner and an admin are let through
    assert_eq!(patch_image!(app, &bob, image.id), StatusCode::OK);
    assert_eq!(patch_image!(app, &alice, image.id), StatusCode::OK);

    // AND: a missing image falls through to 404
    assert_eq!(patch_image!(app, &carol, 999), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_image_lookup_failure_denies() {
    let (ctx, _, bob) = seeded().await;
    let bob_id = ctx.users.snapshot("bob").unwrap().id;
    let image = ctx.images.insert(bob_id, "sunset");
    ctx.images.fail_lookups(true);
    let app = app!(ctx);

    assert_eq!(patch_image!(app, &bob, image.id), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_create_and_list_own_images() {
    let (ctx, alice, bob) = seeded().await;
    let app = app!(ctx);

    let req = test::TestRequest::post()
        .uri("/images")
        .insert_header(bearer(&bob))
        .set_json(serde_json::json!({
            "url": "https://media.example/bob.jpg",
            "description": "mine"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/images")
        .insert_header(bearer(&alice))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));

    let req = test::TestRequest::get()
        .uri("/images")
        .insert_header(bearer(&bob))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed[0]["description"], "mine");
}

#[actix_web::test]
async fn test_user_cannot_delete_someone_else() {
    let (ctx, alice, bob) = seeded().await;
    let alice_id = ctx.users.snapshot("alice").unwrap().id;
    let bob_id = ctx.users.snapshot("bob").unwrap().id;
    let app = app!(ctx);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{alice_id}"))
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{bob_id}"))
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(ctx.users.snapshot("bob").is_none());
}
