// 数据库模块
// 连接池初始化与存储库实现

pub mod repositories;

use sqlx::Executor;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

pub use repositories::{
    BookRepository, PgBookRepository, PgTokenRepository, PgUserRepository, TokenRepository,
    UserRepository,
};

/// 创建数据库连接池
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'bookshelf';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
}

/// 执行 `migrations/` 下的迁移
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
