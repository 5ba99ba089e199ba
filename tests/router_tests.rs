// tests/router_tests.rs

mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use trivia_backend::{
    config::GameSettings, routes, state::AppState, store::MemoryStore, utils::jwt::sign_jwt,
};

use common::{JWT_SECRET, SESSION_TOKEN, seed, test_config};

async fn router() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    seed(&store, 5).await;
    let state = AppState::new(store.clone(), test_config(), GameSettings::default());
    (routes::create_router(state), store)
}

fn bearer(session_token: &str) -> String {
    format!("Bearer {}", sign_jwt(session_token, JWT_SECRET, 600).unwrap())
}

fn post_json(uri: &str, auth: Option<String>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = router().await;

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (app, _) = router().await;

    let response = app
        .oneshot(
            Request::get("/random_path_that_does_not_exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quiz_routes_require_a_bearer_token() {
    let (app, _) = router().await;

    let response = app
        .oneshot(post_json(
            "/api/quiz/start",
            None,
            json!({ "contestId": common::CONTEST_ID }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let (app, _) = router().await;
    let forged = format!(
        "Bearer {}",
        sign_jwt(SESSION_TOKEN, "some_other_secret", 600).unwrap()
    );

    let response = app
        .oneshot(post_json("/api/user/toggle-sound", Some(forged), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_for_a_vanished_session_means_session_expired() {
    let (app, _) = router().await;

    let response = app
        .oneshot(post_json(
            "/api/quiz/start",
            Some(bearer("no-such-session")),
            json!({ "contestId": common::CONTEST_ID }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["reason"], "SERVER_ERROR_SESSION_EXPIRED");
}

#[tokio::test]
async fn toggle_sound_flips_the_setting() {
    let (app, store) = router().await;

    let response = app
        .oneshot(post_json(
            "/api/user/toggle-sound",
            Some(bearer(SESSION_TOKEN)),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["sound"], false);
    assert!(!store.session(SESSION_TOKEN).await.unwrap().settings.sound);
}

#[tokio::test]
async fn settings_accept_a_configured_language() {
    let (app, store) = router().await;

    let response = app
        .oneshot(post_json(
            "/api/user/settings",
            Some(bearer(SESSION_TOKEN)),
            json!({ "language": "he" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let settings = json_body(response).await;
    assert_eq!(settings["language"], "he");
    assert_eq!(settings["sound"], true);
    assert_eq!(
        store.session(SESSION_TOKEN).await.unwrap().settings.language,
        "he"
    );
}

#[tokio::test]
async fn settings_reject_an_unknown_language() {
    let (app, store) = router().await;

    let response = app
        .oneshot(post_json(
            "/api/user/settings",
            Some(bearer(SESSION_TOKEN)),
            json!({ "language": "xx" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], "SERVER_ERROR_UNSUPPORTED_LANGUAGE");
    assert_eq!(
        store.session(SESSION_TOKEN).await.unwrap().settings.language,
        "en"
    );
}

#[tokio::test]
async fn language_without_questions_has_nothing_to_serve() {
    let (app, store) = router().await;
    let mut session = common::session();
    session.settings.language = "es".to_string();
    store.insert_session(session).await;

    let response = app
        .oneshot(post_json(
            "/api/quiz/start",
            Some(bearer(SESSION_TOKEN)),
            json!({ "contestId": common::CONTEST_ID }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["reason"], "SERVER_ERROR_NO_QUESTIONS_AVAILABLE");
}

#[tokio::test]
async fn leaderboard_of_unknown_contest_is_not_found() {
    let (app, _) = router().await;

    let response = app
        .oneshot(
            Request::get("/api/contests/nope/leaderboard")
                .header(header::AUTHORIZATION, bearer(SESSION_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
