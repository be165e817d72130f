use std::sync::Arc;

use crate::models::{
    PaginatedResponse,
    approvals::{
        entities::{Approval, DecisionOutcome},
        requests::{ApprovalDecision, ApprovalListQuery, NewApproval},
    },
    files::{
        entities::{FileEntry, NewFile},
        requests::{FileListQuery, FileUpdate},
    },
    folders::{
        entities::Folder,
        requests::{CreateFolderRequest, FolderListQuery, UpdateFolderRequest},
    },
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
    },
    onboarding::OnboardingStatus,
    outbox::{OutboxBacklog, OutboxEvent, OutboxStatus},
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
    },
    workspaces::{
        entities::{RemovedBlobs, Workspace},
        requests::{CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceListQuery},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的值）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(
        &self,
        query: UserListQuery,
    ) -> Result<PaginatedResponse<User>>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户及其拥有的内容，返回需要清理的磁盘文件；不存在时返回 None
    async fn delete_user(&self, id: i64) -> Result<Option<RemovedBlobs>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 工作区管理方法
    async fn create_workspace(
        &self,
        owner_id: i64,
        req: CreateWorkspaceRequest,
    ) -> Result<Workspace>;
    async fn get_workspace_by_id(&self, id: i64) -> Result<Option<Workspace>>;
    async fn list_workspaces_with_pagination(
        &self,
        query: WorkspaceListQuery,
    ) -> Result<PaginatedResponse<Workspace>>;
    async fn update_workspace(
        &self,
        id: i64,
        update: UpdateWorkspaceRequest,
    ) -> Result<Option<Workspace>>;
    // 事务内删除工作区及其全部内容，返回需要清理的磁盘文件；不存在时返回 None
    async fn delete_workspace(&self, id: i64) -> Result<Option<RemovedBlobs>>;

    /// 文件夹管理方法
    async fn create_folder(&self, user_id: i64, req: CreateFolderRequest) -> Result<Folder>;
    async fn get_folder_by_id(&self, id: i64) -> Result<Option<Folder>>;
    // 同一父目录下按名称查找
    async fn find_sibling_folder(
        &self,
        workspace_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> Result<Option<Folder>>;
    async fn list_folders_with_pagination(
        &self,
        query: FolderListQuery,
    ) -> Result<PaginatedResponse<Folder>>;
    async fn update_folder(&self, id: i64, update: UpdateFolderRequest) -> Result<Option<Folder>>;
    // 是否包含子文件夹或文件
    async fn folder_has_children(&self, id: i64) -> Result<bool>;
    // 事务内删除文件夹子树，返回需要清理的磁盘文件
    async fn delete_folder(&self, id: i64) -> Result<Option<RemovedBlobs>>;

    /// 文件管理方法
    async fn create_file(&self, file: NewFile) -> Result<FileEntry>;
    async fn get_file_by_id(&self, id: i64) -> Result<Option<FileEntry>>;
    async fn list_files_with_pagination(
        &self,
        query: FileListQuery,
    ) -> Result<PaginatedResponse<FileEntry>>;
    async fn update_file(&self, id: i64, update: FileUpdate) -> Result<Option<FileEntry>>;
    // 删除文件记录及其审批，返回被删除的记录
    async fn delete_file(&self, id: i64) -> Result<Option<FileEntry>>;
    // 用户是否（曾）是该文件某个审批的审批人
    async fn is_file_approver(&self, file_id: i64, user_id: i64) -> Result<bool>;

    /// 审批流程方法
    // 新建待审批记录并写入发件箱事件（同一事务）
    async fn create_approval(&self, req: NewApproval) -> Result<Approval>;
    async fn get_approval_by_id(&self, id: i64) -> Result<Option<Approval>>;
    // 以 (id, version, pending) 为条件的比较并交换
    async fn decide_approval(&self, decision: ApprovalDecision) -> Result<DecisionOutcome>;
    async fn list_approvals_with_pagination(
        &self,
        query: ApprovalListQuery,
    ) -> Result<PaginatedResponse<Approval>>;

    /// 通知方法
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification>;
    async fn list_notifications_with_pagination(
        &self,
        query: NotificationListQuery,
    ) -> Result<PaginatedResponse<Notification>>;
    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64>;
    async fn mark_notification_as_read(&self, id: i64, user_id: i64) -> Result<bool>;
    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64>;
    async fn delete_notification(&self, id: i64, user_id: i64) -> Result<bool>;

    /// 新手引导
    async fn get_onboarding_status(&self, user_id: i64) -> Result<OnboardingStatus>;
    async fn upsert_onboarding_status(
        &self,
        user_id: i64,
        completed: bool,
    ) -> Result<OnboardingStatus>;

    /// 发件箱
    // 按 id 顺序取出待分发事件
    async fn fetch_pending_outbox_events(&self, limit: u64) -> Result<Vec<OutboxEvent>>;
    // 事务内写入通知并标记事件已分发；事件已不是 pending 时返回 false
    async fn dispatch_outbox_event(
        &self,
        event_id: i64,
        notifications: Vec<CreateNotificationRequest>,
    ) -> Result<bool>;
    // 记录分发失败，返回事件的新状态
    async fn record_outbox_failure(
        &self,
        event_id: i64,
        error: &str,
        max_attempts: i32,
    ) -> Result<OutboxStatus>;
    async fn outbox_backlog(&self) -> Result<OutboxBacklog>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
