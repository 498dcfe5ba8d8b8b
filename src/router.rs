use axum::{
    Router,
    routing::{get, post},
};
use tower_http::timeout::TimeoutLayer;

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors, log_requests},
    routes,
};

// 认证相关的路由，无需访问令牌
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(routes::auth::sign_up))
        .route("/auth/sign-in", get(routes::auth::sign_in))
        .route("/auth/refresh", get(routes::auth::refresh))
}

// 图书相关的路由，需要 Bearer 访问令牌
fn book_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/books",
            get(routes::book::get_books).post(routes::book::create_book),
        )
        .route(
            "/books/{id}",
            get(routes::book::get_book_by_id)
                .put(routes::book::update_book)
                .delete(routes::book::delete_book),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}

// 接口文档
fn docs_routes() -> Router<AppState> {
    Router::new()
        .route("/swagger", get(routes::docs::swagger_ui))
        .route("/swagger/index.html", get(routes::docs::swagger_ui))
        .route(routes::docs::OPENAPI_JSON_PATH, get(routes::docs::openapi_json))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/ping", get(routes::health::ping))
        .merge(docs_routes())
        .merge(auth_routes())
        .merge(book_routes(&state))
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn(log_requests))
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
