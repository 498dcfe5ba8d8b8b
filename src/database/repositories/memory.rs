//! 内存存储库，用于测试
//!
//! 数据保存在 [`RwLock`] 保护的集合中，所有方法都只需要 `&self`。
//! 语义与 Postgres 实现保持一致：自增 ID、邮箱唯一、每个用户只保留一个刷新令牌。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{BookRepository, TokenRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{Book, NewBook, NewRefreshToken, NewUser, RefreshToken, User};

#[derive(Default)]
pub struct InMemoryBookRepository {
    books: RwLock<BTreeMap<i64, Book>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仓库方法被调用的总次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn get_books(&self) -> Result<Vec<Book>> {
        self.record_call();
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>> {
        self.record_call();
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book> {
        self.record_call();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let book = Book {
            id,
            name: book.name.clone(),
            description: book.description.clone(),
            author: book.author.clone(),
            is_free: book.is_free,
            genres: book.genres.clone(),
            published_at: Utc::now(),
        };
        self.books.write().await.insert(id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: i64, book: &NewBook) -> Result<u64> {
        self.record_call();
        let mut books = self.books.write().await;
        let Some(stored) = books.get_mut(&id) else {
            return Ok(0);
        };
        stored.name = book.name.clone();
        stored.description = book.description.clone();
        stored.author = book.author.clone();
        stored.is_free = book.is_free;
        stored.genres = book.genres.clone();
        Ok(1)
    }

    async fn delete_book(&self, id: i64) -> Result<u64> {
        self.record_call();
        Ok(self.books.write().await.remove(&id).map_or(0, |_| 1))
    }

    async fn book_exists(&self, id: i64) -> Result<bool> {
        self.record_call();
        Ok(self.books.read().await.contains_key(&id))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            registered_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_credentials(&self, email: &str, password_hash: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email && u.password == password_hash)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: RwLock<Vec<RefreshToken>>,
    next_id: AtomicI64,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某用户当前保存的令牌数量
    pub async fn count_for_user(&self, user_id: i64) -> usize {
        self.tokens
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, token: &NewRefreshToken) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|t| t.user_id != token.user_id);
        tokens.push(RefreshToken {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: token.user_id,
            token: token.token.clone(),
            expires_at: token.expires_at,
        });
        Ok(())
    }

    async fn take(&self, token: &str) -> Result<Option<RefreshToken>> {
        let mut tokens = self.tokens.write().await;
        let position = tokens.iter().position(|t| t.token == token);
        Ok(position.map(|index| tokens.remove(index)))
    }
}
