use serde::Serialize;
use ts_rs::TS;

use super::entities::Approval;
use crate::models::users::entities::UserSummary;

/// 审批详情，附带文件名与参与者
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "approval.ts")]
pub struct ApprovalDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub approval: Approval,
    pub file_name: Option<String>,
    pub approver: Option<UserSummary>,
    pub assigner: Option<UserSummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "approval.ts")]
pub struct ApprovalResponse {
    pub approval: Approval,
}
