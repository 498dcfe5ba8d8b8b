use std::sync::Arc;

use crate::config::Config;
use crate::database::{BookRepository, TokenRepository, UserRepository};
use crate::error::AppError;
use crate::services::{BookService, UserService};

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub books: Arc<BookService>,
    pub users: Arc<UserService>,
}

impl AppState {
    /// 根据配置与存储库组装服务
    pub fn new(
        config: Config,
        books: Arc<dyn BookRepository>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
    ) -> Result<Self, AppError> {
        let cache = Arc::new(cache::BookCache::new(config.book_cache_ttl()));
        let hasher = Arc::new(utils::SaltedSha256Hasher::new(config.hash_salt.clone())?);

        let users = UserService::new(
            users,
            tokens,
            hasher,
            config.jwt_secret.as_bytes(),
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        )?;

        Ok(Self {
            books: Arc::new(BookService::new(books, cache)),
            users: Arc::new(users),
            config,
        })
    }
}
