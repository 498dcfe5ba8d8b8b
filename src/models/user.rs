use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, Result};

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// 加盐哈希后的密码
    #[serde(skip_serializing)]
    pub password: String,
    pub registered_at: DateTime<Utc>,
}

/// 注册请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 登录请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// 待写入的用户，`password` 已经是哈希值
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid && !email.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("invalid email: {email}")))
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl SignUpInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(AppError::Validation(format!(
                "name must be at least {MIN_NAME_LEN} characters"
            )));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

impl SignInInput {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(name: &str, email: &str, password: &str) -> SignUpInput {
        SignUpInput {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_well_formed_sign_up() {
        assert!(sign_up("Alice", "a@x.com", "secret1").validate().is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "alice", "@x.com", "a@x", "a@.com", "a@x.com.", "a b@x.com"] {
            assert!(
                sign_up("Alice", email, "secret1").validate().is_err(),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_short_name_and_password() {
        assert!(sign_up("A", "a@x.com", "secret1").validate().is_err());
        assert!(sign_up("Alice", "a@x.com", "abcd").validate().is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Alice".into(),
            email: "a@x.com".into(),
            password: "deadbeef".into(),
            registered_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(json.contains("registeredAt"));
    }
}
