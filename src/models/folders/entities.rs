use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "folder.ts")]
pub struct Folder {
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    /// None 表示位于工作区根目录
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
