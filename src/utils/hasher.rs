use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

/// 密码哈希能力
///
/// 实现必须是确定性的：同一明文总是得到同一摘要，登录时直接比较摘要。
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
}

/// `hex(sha256(password || salt))`，盐来自配置
#[derive(Clone)]
pub struct SaltedSha256Hasher {
    salt: String,
}

impl SaltedSha256Hasher {
    pub fn new(salt: impl Into<String>) -> Result<Self> {
        let salt = salt.into();
        if salt.is_empty() {
            return Err(AppError::Internal("password hash salt is not configured".into()));
        }
        Ok(Self { salt })
    }
}

impl PasswordHasher for SaltedSha256Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(self.salt.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}
