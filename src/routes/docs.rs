use axum::{Json, response::Html};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::error::ErrorResponse;
use crate::models::{Book, BookInput, SignInInput, SignUpInput};
use crate::routes::{auth::AccessTokenResponse, health::PingResponse};

/// OpenAPI 文档的 JSON 路径
pub const OPENAPI_JSON_PATH: &str = "/swagger/doc.json";

/// 接口文档，覆盖全部 REST 接口
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        description = "Book CRUD with access/refresh token authentication"
    ),
    paths(
        crate::routes::health::ping,
        crate::routes::auth::handler::sign_up,
        crate::routes::auth::handler::sign_in,
        crate::routes::auth::handler::refresh,
        crate::routes::book::handler::get_books,
        crate::routes::book::handler::get_book_by_id,
        crate::routes::book::handler::create_book,
        crate::routes::book::handler::update_book,
        crate::routes::book::handler::delete_book
    ),
    components(schemas(
        Book,
        BookInput,
        SignUpInput,
        SignInInput,
        AccessTokenResponse,
        PingResponse,
        ErrorResponse
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness check"),
        (name = "Auth", description = "Sign-up, sign-in and token refresh"),
        (name = "Books", description = "Book CRUD, requires a bearer access token")
    )
)]
pub struct ApiDoc;

// 注册 Bearer 认证方案，图书接口通过 security(("bearer" = [])) 引用
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Bookshelf API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: "/swagger/doc.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#,
    )
}
