//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod approvals;
mod files;
mod folders;
mod notifications;
mod onboarding;
mod outbox;
mod users;
mod workspaces;

use crate::config::AppConfig;
use crate::errors::{FileDeskError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| FileDeskError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| FileDeskError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| FileDeskError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 使用已有连接并执行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(FileDeskError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}


// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(
        &self,
        query: UserListQuery,
    ) -> Result<PaginatedResponse<User>> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<Option<RemovedBlobs>> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 工作区模块
    async fn create_workspace(
        &self,
        owner_id: i64,
        req: CreateWorkspaceRequest,
    ) -> Result<Workspace> {
        self.create_workspace_impl(owner_id, req).await
    }

    async fn get_workspace_by_id(&self, id: i64) -> Result<Option<Workspace>> {
        self.get_workspace_by_id_impl(id).await
    }

    async fn list_workspaces_with_pagination(
        &self,
        query: WorkspaceListQuery,
    ) -> Result<PaginatedResponse<Workspace>> {
        self.list_workspaces_with_pagination_impl(query).await
    }

    async fn update_workspace(
        &self,
        id: i64,
        update: UpdateWorkspaceRequest,
    ) -> Result<Option<Workspace>> {
        self.update_workspace_impl(id, update).await
    }

    async fn delete_workspace(&self, id: i64) -> Result<Option<RemovedBlobs>> {
        self.delete_workspace_impl(id).await
    }

    // 文件夹模块
    async fn create_folder(&self, user_id: i64, req: CreateFolderRequest) -> Result<Folder> {
        self.create_folder_impl(user_id, req).await
    }

    async fn get_folder_by_id(&self, id: i64) -> Result<Option<Folder>> {
        self.get_folder_by_id_impl(id).await
    }

    async fn find_sibling_folder(
        &self,
        workspace_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> Result<Option<Folder>> {
        self.find_sibling_folder_impl(workspace_id, parent_id, name)
            .await
    }

    async fn list_folders_with_pagination(
        &self,
        query: FolderListQuery,
    ) -> Result<PaginatedResponse<Folder>> {
        self.list_folders_with_pagination_impl(query).await
    }

    async fn update_folder(&self, id: i64, update: UpdateFolderRequest) -> Result<Option<Folder>> {
        self.update_folder_impl(id, update).await
    }

    async fn folder_has_children(&self, id: i64) -> Result<bool> {
        self.folder_has_children_impl(id).await
    }

    async fn delete_folder(&self, id: i64) -> Result<Option<RemovedBlobs>> {
        self.delete_folder_impl(id).await
    }

    // 文件模块
    async fn create_file(&self, file: NewFile) -> Result<FileEntry> {
        self.create_file_impl(file).await
    }

    async fn get_file_by_id(&self, id: i64) -> Result<Option<FileEntry>> {
        self.get_file_by_id_impl(id).await
    }

    async fn list_files_with_pagination(
        &self,
        query: FileListQuery,
    ) -> Result<PaginatedResponse<FileEntry>> {
        self.list_files_with_pagination_impl(query).await
    }

    async fn update_file(&self, id: i64, update: FileUpdate) -> Result<Option<FileEntry>> {
        self.update_file_impl(id, update).await
    }

    async fn delete_file(&self, id: i64) -> Result<Option<FileEntry>> {
        self.delete_file_impl(id).await
    }

    async fn is_file_approver(&self, file_id: i64, user_id: i64) -> Result<bool> {
        self.is_file_approver_impl(file_id, user_id).await
    }

    // 审批模块
    async fn create_approval(&self, req: NewApproval) -> Result<Approval> {
        self.create_approval_impl(req).await
    }

    async fn get_approval_by_id(&self, id: i64) -> Result<Option<Approval>> {
        self.get_approval_by_id_impl(id).await
    }

    async fn decide_approval(&self, decision: ApprovalDecision) -> Result<DecisionOutcome> {
        self.decide_approval_impl(decision).await
    }

    async fn list_approvals_with_pagination(
        &self,
        query: ApprovalListQuery,
    ) -> Result<PaginatedResponse<Approval>> {
        self.list_approvals_with_pagination_impl(query).await
    }

    // 通知模块
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification> {
        self.create_notification_impl(req).await
    }

    async fn list_notifications_with_pagination(
        &self,
        query: NotificationListQuery,
    ) -> Result<PaginatedResponse<Notification>> {
        self.list_notifications_with_pagination_impl(query).await
    }

    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64> {
        self.get_unread_notification_count_impl(user_id).await
    }

    async fn mark_notification_as_read(&self, id: i64, user_id: i64) -> Result<bool> {
        self.mark_notification_as_read_impl(id, user_id).await
    }

    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64> {
        self.mark_all_notifications_as_read_impl(user_id).await
    }

    async fn delete_notification(&self, id: i64, user_id: i64) -> Result<bool> {
        self.delete_notification_impl(id, user_id).await
    }

    // 新手引导
    async fn get_onboarding_status(&self, user_id: i64) -> Result<OnboardingStatus> {
        self.get_onboarding_status_impl(user_id).await
    }

    async fn upsert_onboarding_status(
        &self,
        user_id: i64,
        completed: bool,
    ) -> Result<OnboardingStatus> {
        self.upsert_onboarding_status_impl(user_id, completed).await
    }

    // 发件箱
    async fn fetch_pending_outbox_events(&self, limit: u64) -> Result<Vec<OutboxEvent>> {
        self.fetch_pending_outbox_events_impl(limit).await
    }

    async fn dispatch_outbox_event(
        &self,
        event_id: i64,
        notifications: Vec<CreateNotificationRequest>,
    ) -> Result<bool> {
        self.dispatch_outbox_event_impl(event_id, notifications)
            .await
    }

    async fn record_outbox_failure(
        &self,
        event_id: i64,
        error: &str,
        max_attempts: i32,
    ) -> Result<OutboxStatus> {
        self.record_outbox_failure_impl(event_id, error, max_attempts)
            .await
    }

    async fn outbox_backlog(&self) -> Result<OutboxBacklog> {
        self.outbox_backlog_impl().await
    }
}

/// 测试用的内存 SQLite 存储
#[cfg(test)]
pub(crate) mod testing {
    use super::SeaOrmStorage;
    use crate::models::files::entities::{FileEntry, NewFile};
    use crate::models::users::{entities::User, requests::CreateUserRequest};
    use crate::models::workspaces::requests::CreateWorkspaceRequest;
    use sea_orm::{ConnectOptions, Database};

    pub async fn memory_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        // 内存库只在单个连接内可见
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("connect sqlite memory");
        SeaOrmStorage::from_connection(db)
            .await
            .expect("migrate sqlite memory")
    }

    pub async fn seed_user(storage: &SeaOrmStorage, username: &str) -> User {
        storage
            .create_user_impl(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "hashed".to_string(),
                display_name: None,
                is_admin: false,
            })
            .await
            .expect("seed user")
    }

    /// 在新工作区根目录下放一个文件
    pub async fn seed_file(storage: &SeaOrmStorage, owner: &User, name: &str) -> FileEntry {
        let workspace = storage
            .create_workspace_impl(
                owner.id,
                CreateWorkspaceRequest {
                    name: format!("ws-{name}"),
                    description: None,
                },
            )
            .await
            .expect("seed workspace");
        storage
            .create_file_impl(NewFile {
                workspace_id: workspace.id,
                folder_id: None,
                user_id: owner.id,
                name: name.to_string(),
                description: None,
                labels: Vec::new(),
                stored_name: format!("{}-{name}", uuid::Uuid::new_v4()),
                file_size: 1,
                content_type: "application/octet-stream".to_string(),
            })
            .await
            .expect("seed file")
    }
}
