use async_trait::async_trait;
use sqlx::PgPool;

use super::TokenRepository;
use crate::error::Result;
use crate::models::{NewRefreshToken, RefreshToken};

/// 刷新令牌存储库的 Postgres 实现
pub struct PgTokenRepository {
    db: PgPool,
}

impl PgTokenRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn create(&self, token: &NewRefreshToken) -> Result<()> {
        // user_id 上有唯一约束，并发登录时后提交的一方覆盖前者
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn take(&self, token: &str) -> Result<Option<RefreshToken>> {
        // DELETE ... RETURNING 保证并发请求中只有一个能拿到令牌
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token = $1
            RETURNING id, user_id, token, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tokio::task::JoinSet;

    async fn insert_user(pool: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            "INSERT INTO users (name, email, password) VALUES ('Alice', 'a@x.com', 'hash') RETURNING id",
        )
        .fetch_one(pool)
        .await
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn concurrent_creates_keep_one_token_per_user(pool: PgPool) -> sqlx::Result<()> {
        let user_id = insert_user(&pool).await?;
        let repo = std::sync::Arc::new(PgTokenRepository::new(pool.clone()));

        let mut tasks = JoinSet::new();
        for i in 0..8 {
            let repo = repo.clone();
            tasks.spawn(async move {
                repo.create(&NewRefreshToken {
                    user_id,
                    token: format!("token-{i}"),
                    expires_at: Utc::now() + Duration::days(1),
                })
                .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn take_consumes_token_once(pool: PgPool) -> sqlx::Result<()> {
        let user_id = insert_user(&pool).await?;
        let repo = PgTokenRepository::new(pool);
        repo.create(&NewRefreshToken {
            user_id,
            token: "once".into(),
            expires_at: Utc::now() + Duration::days(1),
        })
        .await
        .unwrap();

        assert_eq!(repo.take("once").await.unwrap().unwrap().user_id, user_id);
        assert!(repo.take("once").await.unwrap().is_none());
        Ok(())
    }
}
