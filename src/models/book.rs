use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, Result};

/// 图书实体，`id` 与 `published_at` 由数据库生成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub author: String,
    pub is_free: bool,
    pub genres: Vec<String>,
    pub published_at: DateTime<Utc>,
}

/// 创建/更新图书的请求体
///
/// 所有字段在反序列化层都是可选的，缺失字段由 [`BookInput::validate`] 统一报告，
/// 而不是在 JSON 解码时失败。
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub is_free: Option<bool>,
    pub genres: Option<Vec<String>>,
}

/// 通过校验的图书数据，仓库层只接受这个类型
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub name: String,
    pub description: String,
    pub author: String,
    pub is_free: bool,
    pub genres: Vec<String>,
}

fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::Validation(format!("{field} must not be empty"))),
    }
}

impl BookInput {
    pub fn validate(self) -> Result<NewBook> {
        let name = required_text(self.name, "name")?;
        let description = required_text(self.description, "description")?;
        let author = required_text(self.author, "author")?;
        let is_free = self
            .is_free
            .ok_or_else(|| AppError::Validation("isFree must be set".to_string()))?;
        let genres = match self.genres {
            Some(genres) if !genres.is_empty() => genres,
            _ => {
                return Err(AppError::Validation(
                    "genres must contain at least one genre".to_string(),
                ));
            }
        };

        Ok(NewBook {
            name,
            description,
            author,
            is_free,
            genres,
        })
    }
}
