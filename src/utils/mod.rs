use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

mod hasher;

pub use hasher::{PasswordHasher, SaltedSha256Hasher};

/// 访问令牌唯一接受的签名算法
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
    pub jti: String, // 随机ID，保证同一秒内签发的令牌也不相同
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::from(ErrorKind::InvalidSubject))
    }
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// 生成不透明的刷新令牌（32 字节随机数的十六进制形式）
pub fn generate_refresh_token() -> String {
    random_hex(REFRESH_TOKEN_BYTES)
}

/// 签发访问令牌，返回令牌与过期时间戳
pub fn generate_access_token(
    user_id: i64,
    secret: &[u8],
    ttl: Duration,
) -> Result<(String, i64)> {
    generate_access_token_at(user_id, secret, Utc::now(), ttl)
}

pub fn generate_access_token_at(
    user_id: i64,
    secret: &[u8],
    issued_at: DateTime<Utc>,
    ttl: Duration,
) -> Result<(String, i64)> {
    let expiration = issued_at
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal("access token ttl out of range".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
        iat: issued_at.timestamp(),
        jti: random_hex(16),
    };

    let token = encode(
        &Header::new(TOKEN_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign access token: {}", e)))?;

    Ok((token, expiration))
}

/// 校验访问令牌
///
/// 先检查头部声明的算法，只接受 [`TOKEN_ALGORITHM`]；随后校验签名与过期时间（无宽限）。
pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<Claims, JwtError> {
    let header = decode_header(token)?;
    if header.alg != TOKEN_ALGORITHM {
        tracing::warn!("Rejected token signed with {:?}", header.alg);
        return Err(ErrorKind::InvalidAlgorithm.into());
    }

    let mut validation = Validation::new(TOKEN_ALGORITHM);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;

    Ok(token_data.claims)
}
