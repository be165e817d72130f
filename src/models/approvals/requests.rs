use serde::Deserialize;
use ts_rs::TS;

use super::entities::ApprovalStatus;
use crate::models::common::PaginationQuery;
use crate::models::common::de::optional_i64;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "approval.ts")]
pub struct CreateApprovalRequest {
    pub file_id: i64,
    pub approver_id: i64,
    pub note: Option<String>,
}

/// 审批/驳回/撤回请求，`version` 必须等于客户端读到的版本
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "approval.ts")]
pub struct DecideApprovalRequest {
    pub version: i32,
    pub remarks: Option<String>,
}

// 列表中当前用户的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "approval.ts")]
pub enum ApprovalRole {
    Approver,
    Assigner,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "approval.ts")]
pub struct ApprovalListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<ApprovalRole>,
    pub status: Option<ApprovalStatus>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub file_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ApprovalListQuery {
    pub page: u64,
    pub size: u64,
    pub user_id: i64,
    /// None 表示审批人或发起人任一
    pub role: Option<ApprovalRole>,
    pub status: Option<ApprovalStatus>,
    pub file_id: Option<i64>,
}

/// 存储层的新审批
#[derive(Debug, Clone)]
pub struct NewApproval {
    pub file_id: i64,
    pub approver_id: i64,
    pub assigner_id: i64,
    pub request_note: Option<String>,
}

/// 存储层的状态流转指令
#[derive(Debug, Clone)]
pub struct ApprovalDecision {
    pub approval_id: i64,
    pub expected_version: i32,
    pub target: ApprovalStatus,
    pub remarks: Option<String>,
}
