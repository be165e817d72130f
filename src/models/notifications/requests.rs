use serde::Deserialize;
use ts_rs::TS;

use super::entities::NotificationType;
use crate::models::common::PaginationQuery;
use crate::models::common::de::optional_bool;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct NotificationListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "optional_bool")]
    pub unread_only: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NotificationListQuery {
    pub page: u64,
    pub size: u64,
    pub user_id: i64,
    pub unread_only: bool,
}

/// 由发件箱分发器生成的通知
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: Option<String>,
    pub link: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
}
