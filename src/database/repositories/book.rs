use async_trait::async_trait;
use sqlx::PgPool;

use super::BookRepository;
use crate::error::Result;
use crate::models::{Book, NewBook};

/// 图书存储库的 Postgres 实现
pub struct PgBookRepository {
    db: PgPool,
}

impl PgBookRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn get_books(&self) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, name, description, author, is_free, genres, published_at
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        tracing::debug!("Loaded {} books from database", books.len());
        Ok(books)
    }

    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, name, description, author, is_free, genres, published_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(book)
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (name, description, author, is_free, genres)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, author, is_free, genres, published_at
            "#,
        )
        .bind(&book.name)
        .bind(&book.description)
        .bind(&book.author)
        .bind(book.is_free)
        .bind(&book.genres)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created book {}: {}", book.id, book.name);
        Ok(book)
    }

    async fn update_book(&self, id: i64, book: &NewBook) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET name = $1, description = $2, author = $3, is_free = $4, genres = $5
            WHERE id = $6
            "#,
        )
        .bind(&book.name)
        .bind(&book.description)
        .bind(&book.author)
        .bind(book.is_free)
        .bind(&book.genres)
        .bind(id)
        .execute(&self.db)
        .await?;

        tracing::info!("Updated book {} ({} rows)", id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn delete_book(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!("Deleted book {} ({} rows)", id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn book_exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        Ok(exists)
    }
}
