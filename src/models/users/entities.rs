use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// 展示名称，未设置时回退到用户名
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }

    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(
        &self,
        remember_me: bool,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(self.id, self.is_admin, remember_me)
            .map_err(|e| format!("生成 token 对失败: {e}"))
    }
}

/// 用户摘要，嵌入到审批等响应中
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
        }
    }
}
