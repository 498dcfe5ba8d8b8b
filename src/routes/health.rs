use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

/// Ping响应
#[derive(Serialize, ToSchema)]
pub struct PingResponse {
    /// 服务状态
    pub status: String,
    /// 服务器时间
    pub timestamp: i64,
}

/// 健康检查接口
#[utoipa::path(
    get,
    path = "/ping",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = PingResponse))
)]
pub async fn ping() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }),
    )
}
