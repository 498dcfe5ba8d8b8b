use std::sync::Arc;

use crate::cache::BookCache;
use crate::database::BookRepository;
use crate::error::{AppError, Result};
use crate::models::{Book, BookInput};

/// 图书服务：存储库 + 读穿缓存
pub struct BookService {
    repo: Arc<dyn BookRepository>,
    cache: Arc<BookCache>,
}

fn book_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("book {} not found", id))
}

impl BookService {
    pub fn new(repo: Arc<dyn BookRepository>, cache: Arc<BookCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn get_books(&self) -> Result<Vec<Book>> {
        if let Some(books) = self.cache.get_all() {
            return Ok(books);
        }

        let epoch = self.cache.epoch();
        let books = self.repo.get_books().await?;
        self.cache.put_all_since(epoch, books.clone());

        Ok(books)
    }

    pub async fn get_book_by_id(&self, id: i64) -> Result<Book> {
        if let Some(book) = self.cache.get(id) {
            return Ok(book);
        }

        let epoch = self.cache.epoch();
        let book = self
            .repo
            .get_book_by_id(id)
            .await?
            .ok_or_else(|| book_not_found(id))?;
        self.cache.put_since(epoch, book.clone());

        Ok(book)
    }

    pub async fn create_book(&self, input: BookInput) -> Result<Book> {
        let book = input.validate()?;
        let book = self.repo.create_book(&book).await?;

        // 新书尚未进入缓存，全集不再完整
        self.cache.mark_dirty();
        tracing::info!("Book {} created", book.id);

        Ok(book)
    }

    pub async fn update_book(&self, id: i64, input: BookInput) -> Result<()> {
        let book = input.validate()?;
        if !self.repo.book_exists(id).await? {
            return Err(book_not_found(id));
        }
        let updated = self.repo.update_book(id, &book).await?;

        self.cache.invalidate(id);
        // 探测之后被并发删除
        if updated == 0 {
            return Err(book_not_found(id));
        }
        tracing::info!("Book {} updated", id);

        Ok(())
    }

    pub async fn delete_book(&self, id: i64) -> Result<()> {
        if !self.repo.book_exists(id).await? {
            return Err(book_not_found(id));
        }
        let deleted = self.repo.delete_book(id).await?;

        self.cache.invalidate(id);
        if deleted == 0 {
            return Err(book_not_found(id));
        }
        tracing::info!("Book {} deleted", id);

        Ok(())
    }
}
