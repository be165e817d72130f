use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::common::de::optional_bool;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "workspace.ts")]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "workspace.ts")]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "workspace.ts")]
pub struct WorkspaceListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    /// 管理员查看全部工作区
    #[serde(default, deserialize_with = "optional_bool")]
    pub all: Option<bool>,
}

// 存储层查询参数
#[derive(Debug, Clone)]
pub struct WorkspaceListQuery {
    pub page: u64,
    pub size: u64,
    /// None 表示不按所有者过滤
    pub owner_id: Option<i64>,
    pub search: Option<String>,
}
