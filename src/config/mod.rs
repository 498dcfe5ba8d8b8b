use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub hash_salt: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub book_cache_ttl_secs: u64,
    pub db_max_connections: u32,
    pub request_timeout_secs: u64,
    pub run_migrations: bool,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn optional<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// 解析 "12h"、"30d" 或纯数字形式的时长，纯数字按 `unit_secs` 计
fn parse_duration_secs(value: &str, unit_secs: u64) -> Option<u64> {
    let value = value.trim();
    let (number, unit) = match value.char_indices().last() {
        Some((idx, 'h')) => (&value[..idx], 3600),
        Some((idx, 'd')) => (&value[..idx], 24 * 3600),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 's')) => (&value[..idx], 1),
        _ => (value, unit_secs),
    };
    number.trim().parse::<u64>().ok()?.checked_mul(unit)
}

fn duration_secs(
    name: &'static str,
    default_secs: u64,
    unit_secs: u64,
) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => {
            parse_duration_secs(&value, unit_secs).ok_or(ConfigError::Invalid { name, value })
        }
        Err(_) => Ok(default_secs),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            server_host: optional("SERVER_HOST", "0.0.0.0".to_string())?,
            server_port: optional("SERVER_PORT", 3000)?,
            jwt_secret: required("JWT_SECRET")?,
            hash_salt: required("HASH_SALT")?,
            access_token_ttl_secs: duration_secs("ACCESS_TOKEN_TTL", 12 * 3600, 3600)?,
            refresh_token_ttl_secs: duration_secs("REFRESH_TOKEN_TTL", 30 * 24 * 3600, 24 * 3600)?,
            book_cache_ttl_secs: duration_secs("BOOK_CACHE_TTL", 8 * 3600, 3600)?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", 10)?,
            request_timeout_secs: optional("REQUEST_TIMEOUT_SECS", 30)?,
            run_migrations: optional("RUN_MIGRATIONS", false)?,
        })
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }

    pub fn book_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.book_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixed_durations() {
        assert_eq!(parse_duration_secs("12h", 3600), Some(12 * 3600));
        assert_eq!(parse_duration_secs("30d", 3600), Some(30 * 24 * 3600));
        assert_eq!(parse_duration_secs("15m", 3600), Some(900));
        assert_eq!(parse_duration_secs("45s", 3600), Some(45));
    }

    #[test]
    fn bare_numbers_use_default_unit() {
        assert_eq!(parse_duration_secs("8", 3600), Some(8 * 3600));
        assert_eq!(parse_duration_secs(" 2 ", 24 * 3600), Some(2 * 24 * 3600));
    }

    #[test]
    fn rejects_garbage_durations() {
        assert_eq!(parse_duration_secs("soon", 3600), None);
        assert_eq!(parse_duration_secs("h", 3600), None);
        assert_eq!(parse_duration_secs("-1h", 3600), None);
    }
}
