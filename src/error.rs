use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// 应用错误类型，所有服务层与处理器共用
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求数据缺失或格式错误
    #[error("{0}")]
    Validation(String),

    /// 图书、用户或刷新令牌不存在
    #[error("{0}")]
    NotFound(String),

    /// 唯一性冲突（例如邮箱已注册）
    #[error("{0}")]
    Conflict(String),

    /// 刷新令牌已过期，需要重新登录
    #[error("session expired")]
    Expired,

    /// 访问令牌无效（签名、算法、过期或声明错误）
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// 错误响应体
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: i32,
    pub error_message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Expired | AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 使用指定状态码构建响应，供需要覆盖默认映射的路由使用
    pub fn into_response_with(self, status: StatusCode) -> Response {
        // 不向客户端暴露数据库内部细节
        let error_message = match &self {
            AppError::Database(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message,
        });

        (status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(e) = &self {
            tracing::error!("Database error: {:?}", e);
        }
        let status = self.status();
        self.into_response_with(status)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::InvalidToken(e.to_string())
    }
}
