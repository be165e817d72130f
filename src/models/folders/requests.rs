use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::common::de::{optional_bool, optional_i64, string_or_i64};

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "folder.ts")]
pub struct CreateFolderRequest {
    pub workspace_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// 更新文件夹；`parent_id` 为 `Some(None)` 时移动到根目录
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "folder.ts")]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::models::common::de::double_option")]
    #[ts(optional)]
    pub parent_id: Option<Option<i64>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "folder.ts")]
pub struct FolderListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(deserialize_with = "string_or_i64")]
    pub workspace_id: i64,
    #[serde(default, deserialize_with = "optional_i64")]
    pub parent_id: Option<i64>,
    /// 仅列出根目录下的文件夹
    #[serde(default, deserialize_with = "optional_bool")]
    pub root_only: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "folder.ts")]
pub struct DeleteFolderParams {
    #[serde(default, deserialize_with = "optional_bool")]
    pub recursive: Option<bool>,
}

/// 父目录过滤条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    Any,
    Root,
    Folder(i64),
}

// 存储层查询参数
#[derive(Debug, Clone)]
pub struct FolderListQuery {
    pub page: u64,
    pub size: u64,
    pub workspace_id: i64,
    pub parent: ParentFilter,
    pub search: Option<String>,
}
