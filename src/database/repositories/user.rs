use async_trait::async_trait;
use sqlx::PgPool;

use super::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{NewUser, User};

/// 用户存储库的 Postgres 实现
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password, registered_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => {
                tracing::info!("Created user {}", user.id);
                Ok(user)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("user with email {} already exists", user.email),
            )),
            Err(e) => {
                tracing::error!("Failed to create user: {:?}", e);
                Err(e.into())
            }
        }
    }

    async fn get_by_credentials(&self, email: &str, password_hash: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, registered_at
            FROM users
            WHERE email = $1 AND password = $2
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}
