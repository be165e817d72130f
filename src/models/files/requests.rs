use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::common::de::{optional_bool, optional_i64, string_or_i64};

/// 更新文件元数据；`folder_id` 为 `Some(None)` 时移动到工作区根目录
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct UpdateFileRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::models::common::de::double_option")]
    #[ts(optional)]
    pub folder_id: Option<Option<i64>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(deserialize_with = "string_or_i64")]
    pub workspace_id: i64,
    #[serde(default, deserialize_with = "optional_i64")]
    pub folder_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_bool")]
    pub root_only: Option<bool>,
    pub search: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileListQuery {
    pub page: u64,
    pub size: u64,
    pub workspace_id: i64,
    pub folder: crate::models::folders::requests::ParentFilter,
    pub search: Option<String>,
    pub label: Option<String>,
}

/// 存储层的元数据更新；`folder_id` 语义同请求
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    pub folder_id: Option<Option<i64>>,
}
