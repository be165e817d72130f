use serde::Serialize;
use ts_rs::TS;

/// 未读通知数量响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// 标记全部已读响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct MarkAllReadResponse {
    pub marked_count: i64,
}
