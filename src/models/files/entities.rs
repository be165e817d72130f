use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 文件元数据，实际内容以 stored_name 存放在上传目录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileEntry {
    pub id: i64,
    pub workspace_id: i64,
    pub folder_id: Option<i64>,
    // 上传者
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub stored_name: String,
    pub file_size: i64,
    pub content_type: String,
    pub download_token: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 写入数据库的新文件记录
#[derive(Debug, Clone)]
pub struct NewFile {
    pub workspace_id: i64,
    pub folder_id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub stored_name: String,
    pub file_size: i64,
    pub content_type: String,
}
