//! 事务性发件箱事件

use serde::{Deserialize, Serialize};

use super::approvals::entities::{Approval, ApprovalStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxEventType {
    ApprovalRequested,
    ApprovalApproved,
    ApprovalRejected,
    ApprovalWithdrawn,
}

impl OutboxEventType {
    /// 审批进入某状态时对应的事件
    pub fn for_status(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => OutboxEventType::ApprovalRequested,
            ApprovalStatus::Approved => OutboxEventType::ApprovalApproved,
            ApprovalStatus::Rejected => OutboxEventType::ApprovalRejected,
            ApprovalStatus::Withdrawn => OutboxEventType::ApprovalWithdrawn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxEventType::ApprovalRequested => "approval_requested",
            OutboxEventType::ApprovalApproved => "approval_approved",
            OutboxEventType::ApprovalRejected => "approval_rejected",
            OutboxEventType::ApprovalWithdrawn => "approval_withdrawn",
        }
    }
}

impl std::fmt::Display for OutboxEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutboxEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approval_requested" => Ok(OutboxEventType::ApprovalRequested),
            "approval_approved" => Ok(OutboxEventType::ApprovalApproved),
            "approval_rejected" => Ok(OutboxEventType::ApprovalRejected),
            "approval_withdrawn" => Ok(OutboxEventType::ApprovalWithdrawn),
            _ => Err(format!("Invalid outbox event type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    Pending,
    Dispatched,
    Failed,
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboxStatus::Pending => write!(f, "pending"),
            OutboxStatus::Dispatched => write!(f, "dispatched"),
            OutboxStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for OutboxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OutboxStatus::Pending),
            "dispatched" => Ok(OutboxStatus::Dispatched),
            "failed" => Ok(OutboxStatus::Failed),
            _ => Err(format!("Invalid outbox status: {s}")),
        }
    }
}

/// 审批事件负载，写入时即固化参与者，分发时不再回查审批表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEventPayload {
    pub approval_id: i64,
    pub file_id: i64,
    pub file_name: String,
    pub approver_id: i64,
    pub assigner_id: i64,
    pub status: ApprovalStatus,
    pub version: i32,
    pub note: Option<String>,
}

impl ApprovalEventPayload {
    pub fn from_approval(approval: &Approval, file_name: &str) -> Self {
        Self {
            approval_id: approval.id,
            file_id: approval.file_id,
            file_name: file_name.to_string(),
            approver_id: approval.approver_id,
            assigner_id: approval.assigner_id,
            status: approval.status,
            version: approval.version,
            note: match approval.status {
                ApprovalStatus::Pending => approval.request_note.clone(),
                _ => approval.remarks.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutboxEvent {
    pub id: i64,
    pub event_type: OutboxEventType,
    pub aggregate_type: String,
    pub aggregate_id: i64,
    pub payload: String,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub dispatched_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 未分发事件统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutboxBacklog {
    pub pending: u64,
    pub failed: u64,
}
