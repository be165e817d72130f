use crate::models::users::entities::User;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct LoginResponse {
    pub access_token: String,
    /// access token 有效期（秒）
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}
