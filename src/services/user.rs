use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::database::{TokenRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{NewRefreshToken, NewUser, SignInInput, SignUpInput, TokenPair, User};
use crate::utils::{
    PasswordHasher, generate_access_token, generate_refresh_token, verify_access_token,
};

/// 用户服务：注册、登录、访问令牌校验与刷新令牌轮换
///
/// 访问令牌是自校验的 HS256 JWT，受保护接口无需查库；刷新令牌保存在数据库中，
/// 每次刷新都会被消费并替换，每个用户同一时间只有一个有效的刷新令牌。
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    hasher: Arc<dyn PasswordHasher>,
    secret: Vec<u8>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

fn to_chrono(duration: std::time::Duration) -> Result<Duration> {
    Duration::from_std(duration)
        .map_err(|e| AppError::Internal(format!("token ttl out of range: {}", e)))
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        hasher: Arc<dyn PasswordHasher>,
        secret: impl Into<Vec<u8>>,
        access_ttl: std::time::Duration,
        refresh_ttl: std::time::Duration,
    ) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AppError::Internal("jwt secret is not configured".into()));
        }

        Ok(Self {
            users,
            tokens,
            hasher,
            secret,
            access_ttl: to_chrono(access_ttl)?,
            refresh_ttl: to_chrono(refresh_ttl)?,
        })
    }

    pub async fn sign_up(&self, input: SignUpInput) -> Result<User> {
        input.validate()?;
        let password = self.hasher.hash(&input.password)?;

        let user = self
            .users
            .create_user(&NewUser {
                name: input.name,
                email: input.email,
                password,
            })
            .await?;

        tracing::info!("User {} signed up", user.id);
        Ok(user)
    }

    pub async fn sign_in(&self, input: SignInInput) -> Result<TokenPair> {
        input.validate()?;
        let password = self.hasher.hash(&input.password)?;

        let user = self
            .users
            .get_by_credentials(&input.email, &password)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        tracing::info!("User {} signed in", user.id);
        self.issue_token_pair(user.id).await
    }

    /// 校验访问令牌并返回用户ID
    pub fn parse_token(&self, access_token: &str) -> Result<i64> {
        let claims = verify_access_token(access_token, &self.secret)?;
        Ok(claims.user_id()?)
    }

    /// 消费刷新令牌并签发新的一对令牌
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair> {
        let stored = self
            .tokens
            .take(refresh_token)
            .await?
            .ok_or_else(|| AppError::NotFound("refresh token not found".to_string()))?;

        if stored.expires_at < Utc::now() {
            tracing::debug!("Refresh token for user {} expired", stored.user_id);
            return Err(AppError::Expired);
        }

        self.issue_token_pair(stored.user_id).await
    }

    pub async fn issue_token_pair(&self, user_id: i64) -> Result<TokenPair> {
        let (access_token, _) = generate_access_token(user_id, &self.secret, self.access_ttl)?;

        let expires_at = Utc::now()
            .checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| AppError::Internal("refresh token ttl out of range".to_string()))?;

        let refresh_token = generate_refresh_token();
        self.tokens
            .create(&NewRefreshToken {
                user_id,
                token: refresh_token.clone(),
                expires_at,
            })
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
