use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 工作区：用户拥有的顶层容器
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "workspace.ts")]
pub struct Workspace {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 删除工作区或文件夹后需要从磁盘清理的文件
#[derive(Debug, Clone, Default)]
pub struct RemovedBlobs {
    pub stored_names: Vec<String>,
}
