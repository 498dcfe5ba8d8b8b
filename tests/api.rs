use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use bookshelf::{
    AppState,
    config::Config,
    database::{
        TokenRepository,
        repositories::{InMemoryBookRepository, InMemoryTokenRepository, InMemoryUserRepository},
    },
    models::NewRefreshToken,
    router::create_router,
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        server_host: "127.0.0.1".into(),
        server_port: 0,
        jwt_secret: "integration-secret".into(),
        hash_salt: "integration-salt".into(),
        access_token_ttl_secs: 3600,
        refresh_token_ttl_secs: 24 * 3600,
        book_cache_ttl_secs: 8 * 3600,
        db_max_connections: 1,
        request_timeout_secs: 30,
        run_migrations: false,
    }
}

fn app_with_tokens() -> (Router, Arc<InMemoryTokenRepository>) {
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let state = AppState::new(
        test_config(),
        Arc::new(InMemoryBookRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        tokens.clone(),
    )
    .unwrap();
    (create_router(state), tokens)
}

fn app() -> Router {
    app_with_tokens().0
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn refresh_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("refresh cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/auth"));
    assert!(set_cookie.contains("Max-Age=86400"));
    set_cookie.split(';').next().unwrap().to_string()
}

fn book_json(name: &str) -> Value {
    json!({
        "name": name,
        "description": "A novel",
        "author": "Frank Herbert",
        "isFree": false,
        "genres": ["sf", "classic"]
    })
}

/// 注册并登录，返回访问令牌与刷新令牌 Cookie
async fn sign_in(app: &Router) -> (String, String) {
    let response = send(
        app,
        json_request(
            "POST",
            "/auth/sign-up",
            json!({"name": "Alice", "email": "a@x.com", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "signed up");

    let response = send(
        app,
        json_request(
            "GET",
            "/auth/sign-in",
            json!({"email": "a@x.com", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = refresh_cookie(&response);
    let body = body_json(response).await;
    let token = body["accessToken"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    (token, cookie)
}

#[tokio::test]
async fn ping_is_public() {
    let app = app();
    let response = send(&app, Request::get("/ping").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn api_docs_are_public() {
    let app = app();

    let response = send(
        &app,
        Request::get("/swagger/doc.json").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/books/{id}"]["delete"].is_object());
    assert!(doc["paths"]["/auth/refresh"]["get"].is_object());

    let response = send(
        &app,
        Request::get("/swagger/index.html").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/swagger/doc.json"));
}

#[tokio::test]
async fn books_require_bearer_token() {
    let app = app();

    let response = send(&app, Request::get("/books").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, authed("GET", "/books", "garbage", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn book_crud_flow() {
    let app = app();
    let (token, _) = sign_in(&app).await;

    let response = send(&app, authed("POST", "/books", &token, Some(book_json("Dune")))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["isFree"], false);

    let response = send(&app, authed("GET", &format!("/books/{id}"), &token, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched, created);

    let response = send(&app, authed("GET", "/books", &token, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        authed("PUT", &format!("/books/{id}"), &token, Some(book_json("Dune Messiah"))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, authed("GET", &format!("/books/{id}"), &token, None)).await;
    assert_eq!(body_json(response).await["name"], "Dune Messiah");

    let response = send(&app, authed("DELETE", &format!("/books/{id}"), &token, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, authed("GET", &format!("/books/{id}"), &token, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, authed("GET", "/books", &token, None)).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let response = send(&app, authed("DELETE", &format!("/books/{id}"), &token, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_book_input_is_bad_request() {
    let app = app();
    let (token, _) = sign_in(&app).await;

    let mut incomplete = book_json("X");
    incomplete.as_object_mut().unwrap().remove("description");
    let response = send(&app, authed("POST", "/books", &token, Some(incomplete))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        authed("POST", "/books", &token, Some(json!({"name": 5}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, authed("GET", "/books/abc", &token, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, authed("GET", "/books", &token, None)).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn refresh_rotates_cookie_once() {
    let app = app();
    let (_, cookie) = sign_in(&app).await;

    let refresh = |cookie: &str| {
        Request::get("/auth/refresh")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    };

    let response = send(&app, refresh(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = refresh_cookie(&response);
    assert_ne!(rotated, cookie);
    let token = body_json(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(&app, authed("GET", "/books", &token, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, refresh(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, refresh(&rotated)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_refresh_cookie_requires_new_sign_in() {
    let (app, tokens) = app_with_tokens();
    sign_in(&app).await;

    // 内存存储库中第一个用户的ID为 1
    tokens
        .create(&NewRefreshToken {
            user_id: 1,
            token: "stale".into(),
            expires_at: Utc::now() - Duration::minutes(1),
        })
        .await
        .unwrap();

    let request = || {
        Request::get("/auth/refresh")
            .header(header::COOKIE, "refresh-token=stale")
            .body(Body::empty())
            .unwrap()
    };

    let response = send(&app, request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert_eq!(body["error_message"], "session expired");

    // 过期令牌已被消费
    let response = send(&app, request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_ne!(body_json(response).await["error_message"], "session expired");
}

#[tokio::test]
async fn refresh_without_cookie_is_bad_request() {
    let app = app();
    let response = send(
        &app,
        Request::get("/auth/refresh").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_failures_map_to_documented_statuses() {
    let app = app();
    sign_in(&app).await;

    let response = send(
        &app,
        json_request(
            "GET",
            "/auth/sign-in",
            json!({"email": "a@x.com", "password": "wrong-password"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = send(
        &app,
        json_request(
            "POST",
            "/auth/sign-up",
            json!({"name": "Alice", "email": "a@x.com", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        json_request(
            "POST",
            "/auth/sign-up",
            json!({"name": "Bob", "email": "bob", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
