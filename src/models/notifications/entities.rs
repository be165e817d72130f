use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 通知类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "notification.ts")]
pub enum NotificationType {
    ApprovalRequested,
    ApprovalApproved,
    ApprovalRejected,
    ApprovalWithdrawn,
    System,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationType::ApprovalRequested => "approval_requested",
            NotificationType::ApprovalApproved => "approval_approved",
            NotificationType::ApprovalRejected => "approval_rejected",
            NotificationType::ApprovalWithdrawn => "approval_withdrawn",
            NotificationType::System => "system",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approval_requested" => Ok(NotificationType::ApprovalRequested),
            "approval_approved" => Ok(NotificationType::ApprovalApproved),
            "approval_rejected" => Ok(NotificationType::ApprovalRejected),
            "approval_withdrawn" => Ok(NotificationType::ApprovalWithdrawn),
            "system" => Ok(NotificationType::System),
            _ => Err(format!("Invalid notification type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub link: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
