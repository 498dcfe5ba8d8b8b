use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, ErrorResponse, Result},
    middleware::AuthUser,
    models::{Book, BookInput},
};

#[utoipa::path(
    get,
    path = "/books",
    tag = "Books",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All books ordered by id", body = Vec<Book>),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>> {
    let books = state.books.get_books().await?;
    Ok(Json(books))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Books",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 404, description = "No such book", body = ErrorResponse)
    )
)]
pub async fn get_book_by_id(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Book>> {
    let book = state.books.get_book_by_id(id).await?;
    Ok(Json(book))
}

#[utoipa::path(
    post,
    path = "/books",
    tag = "Books",
    security(("bearer" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn create_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(input), _): WithRejection<Json<BookInput>, AppError>,
) -> Result<(StatusCode, Json<Book>)> {
    let book = state.books.create_book(input).await?;
    tracing::debug!("用户 {} 创建图书 {}", user.user_id, book.id);
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "Books",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Book id")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 404, description = "No such book", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn update_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(input), _): WithRejection<Json<BookInput>, AppError>,
) -> Result<(StatusCode, &'static str)> {
    state.books.update_book(id, input).await?;
    tracing::debug!("用户 {} 更新图书 {}", user.user_id, id);
    Ok((StatusCode::OK, "Book successfully updated"))
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "Books",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book removed", body = String, content_type = "text/plain"),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 404, description = "No such book", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<(StatusCode, &'static str)> {
    state.books.delete_book(id).await?;
    tracing::debug!("用户 {} 删除图书 {}", user.user_id, id);
    Ok((StatusCode::OK, "Book successfully removed"))
}
