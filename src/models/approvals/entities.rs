use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 审批状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "approval.ts")]
pub enum ApprovalStatus {
    Pending,   // 待审批
    Approved,  // 已通过
    Rejected,  // 已驳回
    Withdrawn, // 已撤回
}

impl ApprovalStatus {
    pub const PENDING: &'static str = "pending";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";
    pub const WITHDRAWN: &'static str = "withdrawn";

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => Self::PENDING,
            ApprovalStatus::Approved => Self::APPROVED,
            ApprovalStatus::Rejected => Self::REJECTED,
            ApprovalStatus::Withdrawn => Self::WITHDRAWN,
        }
    }

    /// 终态没有任何出边
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl<'de> Deserialize<'de> for ApprovalStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid approval status: '{s}'. Supported: pending, approved, rejected, withdrawn"
            ))
        })
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(ApprovalStatus::Pending),
            Self::APPROVED => Ok(ApprovalStatus::Approved),
            Self::REJECTED => Ok(ApprovalStatus::Rejected),
            Self::WITHDRAWN => Ok(ApprovalStatus::Withdrawn),
            _ => Err(format!("Invalid approval status: {s}")),
        }
    }
}

// 审批动作，对应 /approvals/{id}/{action}
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "approval.ts")]
pub enum ApprovalAction {
    Approve,
    Reject,
    Withdraw,
}

impl std::fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalAction::Approve => write!(f, "approve"),
            ApprovalAction::Reject => write!(f, "reject"),
            ApprovalAction::Withdraw => write!(f, "withdraw"),
        }
    }
}

impl std::str::FromStr for ApprovalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ApprovalAction::Approve),
            "reject" => Ok(ApprovalAction::Reject),
            "withdraw" => Ok(ApprovalAction::Withdraw),
            _ => Err(format!("Invalid approval action: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "approval.ts")]
pub struct Approval {
    pub id: i64,
    pub file_id: i64,
    pub approver_id: i64,
    pub assigner_id: i64,
    pub status: ApprovalStatus,
    pub request_note: Option<String>,
    pub remarks: Option<String>,
    // 乐观锁版本号，每次状态变更 +1
    pub version: i32,
    pub requested_at: chrono::DateTime<chrono::Utc>,
    pub decided_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 审批流转写入结果
#[derive(Debug, Clone)]
pub enum DecisionOutcome {
    Applied(Approval),
    /// 版本号或状态已变化，携带当前最新记录
    Stale(Approval),
}
