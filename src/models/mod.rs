//! 数据模型定义
//!
//! 请求/响应结构与业务实体，和 `entity` 中的数据库模型分离。

pub mod approvals;
pub mod auth;
pub mod common;
pub mod files;
pub mod folders;
pub mod notifications;
pub mod onboarding;
pub mod outbox;
pub mod system;
pub mod users;
pub mod workspaces;

pub use common::{
    ApiResponse, ErrorCode, PaginatedResponse, PaginationInfo, PaginationQuery,
};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
