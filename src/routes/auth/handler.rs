use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};

use crate::{
    AppState,
    error::{AppError, ErrorResponse},
    models::{SignInInput, SignUpInput, TokenPair},
};

use super::model::AccessTokenResponse;

/// 刷新令牌 Cookie 名称
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";

/// 刷新令牌 Cookie 的作用路径
const REFRESH_TOKEN_PATH: &str = "/auth";

// 认证接口除服务端错误外统一返回 400
fn client_or_server_error(err: AppError) -> Response {
    let status = if err.status().is_server_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    err.into_response_with(status)
}

fn token_response(state: &AppState, jar: CookieJar, pair: TokenPair) -> Response {
    let max_age = time::Duration::seconds(state.config.refresh_token_ttl_secs as i64);
    let cookie = Cookie::build((REFRESH_TOKEN_COOKIE, pair.refresh_token))
        .http_only(true)
        .path(REFRESH_TOKEN_PATH)
        .same_site(SameSite::Strict)
        .max_age(max_age);

    (
        jar.add(cookie),
        Json(AccessTokenResponse {
            access_token: pair.access_token,
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/auth/sign-up",
    tag = "Auth",
    request_body = SignUpInput,
    responses(
        (status = 200, description = "User registered", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid input or email already registered", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SignUpInput>, AppError>,
) -> Response {
    match state.users.sign_up(req).await {
        Ok(_) => (StatusCode::OK, "signed up").into_response(),
        Err(e) => {
            tracing::warn!("Sign up failed: {}", e);
            client_or_server_error(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth/sign-in",
    tag = "Auth",
    request_body = SignInInput,
    responses(
        (status = 200, description = "Access token; refresh token set as cookie", body = AccessTokenResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Unknown credentials or server failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<SignInInput>, AppError>,
) -> Response {
    match state.users.sign_in(req).await {
        Ok(pair) => token_response(&state, jar, pair),
        Err(e @ AppError::NotFound(_)) => {
            tracing::warn!("Sign in failed: user not found");
            e.into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            tracing::warn!("Sign in failed: {}", e);
            client_or_server_error(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth/refresh",
    tag = "Auth",
    params(("refresh-token" = String, Cookie, description = "Refresh token issued at sign-in")),
    responses(
        (status = 200, description = "New access token; refresh cookie rotated", body = AccessTokenResponse),
        (status = 400, description = "Missing, unknown or expired refresh token", body = ErrorResponse),
        (status = 500, description = "Server failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_owned()) else {
        return AppError::Validation("refresh token cookie is missing".to_string())
            .into_response_with(StatusCode::BAD_REQUEST);
    };

    match state.users.refresh_tokens(&token).await {
        Ok(pair) => token_response(&state, jar, pair),
        Err(e) => {
            tracing::warn!("Token refresh failed: {}", e);
            client_or_server_error(e)
        }
    }
}
