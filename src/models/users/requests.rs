use crate::models::common::PaginationQuery;
use crate::models::common::de::optional_bool;
use serde::Deserialize;
use ts_rs::TS;

// 用户列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "optional_bool")]
    pub is_admin: Option<bool>,
    pub search: Option<String>,
}

// 注册请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

// 用户创建请求（管理员）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<RegisterRequest> for CreateUserRequest {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            is_admin: false,
        }
    }
}

// 用户更新请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

// 用户列表查询参数（用于存储层）
#[derive(Debug, Clone)]
pub struct UserListQuery {
    pub page: u64,
    pub size: u64,
    pub is_admin: Option<bool>,
    pub search: Option<String>,
}
