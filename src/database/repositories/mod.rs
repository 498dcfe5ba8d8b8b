// 存储库模块
// 定义服务层依赖的存储能力，并提供 Postgres 与内存两种实现

mod book;
#[cfg(any(test, feature = "mock"))]
pub mod memory;
mod token;
mod user;

pub use book::PgBookRepository;
#[cfg(any(test, feature = "mock"))]
pub use memory::{InMemoryBookRepository, InMemoryTokenRepository, InMemoryUserRepository};
pub use token::PgTokenRepository;
pub use user::PgUserRepository;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Book, NewBook, NewRefreshToken, NewUser, RefreshToken, User};

/// 图书存储
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn get_books(&self) -> Result<Vec<Book>>;

    async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>>;

    /// 写入新图书，返回数据库生成的完整记录
    async fn create_book(&self, book: &NewBook) -> Result<Book>;

    /// 返回受影响的行数，0 表示图书已不存在
    async fn update_book(&self, id: i64, book: &NewBook) -> Result<u64>;

    /// 返回受影响的行数，0 表示图书已不存在
    async fn delete_book(&self, id: i64) -> Result<u64>;

    async fn book_exists(&self, id: i64) -> Result<bool>;
}

/// 用户存储
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 邮箱已存在时返回 `AppError::Conflict`
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// 按邮箱与密码哈希查找用户
    async fn get_by_credentials(&self, email: &str, password_hash: &str) -> Result<Option<User>>;
}

/// 刷新令牌存储
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// 保存新令牌，并删除该用户之前的所有令牌
    async fn create(&self, token: &NewRefreshToken) -> Result<()>;

    /// 取出并删除令牌，令牌只能被消费一次
    async fn take(&self, token: &str) -> Result<Option<RefreshToken>>;
}
