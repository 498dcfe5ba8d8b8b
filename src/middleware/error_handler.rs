use std::time::Instant;

use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::{error, info};

// 错误响应体只用于日志，超过上限时不读取
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// 记录每个请求的方法、路径、状态码与耗时
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}

/// 服务端错误时把响应体写入日志
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to read error response body: {}", e);
            parts.headers.remove(header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    error!(
        "Server error occurred - Status: {}, Body: {}",
        parts.status,
        String::from_utf8_lossy(&bytes)
    );

    // 重置body以便重新构建响应
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
