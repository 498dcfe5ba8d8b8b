use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 登录与刷新接口的响应体，刷新令牌通过 Cookie 下发
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}
