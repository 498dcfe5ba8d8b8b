use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::{AppState, error::AppError};

/// 通过认证的用户，由 [`auth_middleware`] 写入请求扩展
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// 校验 `Authorization: Bearer <token>`，失败返回 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|e| {
        tracing::debug!("Rejected request without bearer token: {}", e);
        AppError::InvalidToken(e.to_string())
    })?;

    let user_id = state.users.parse_token(bearer.token()).map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        e
    })?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}
