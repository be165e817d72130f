use super::SeaOrmStorage;
use crate::entity::prelude::{Files, Folders, Workspaces};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::entity::{files, folders, workspaces};
use crate::errors::{FileDeskError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
    },
    workspaces::entities::RemovedBlobs,
};
use crate::utils::contains_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            display_name: Set(req.display_name),
            is_admin: Set(req.is_admin),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("创建用户失败", e))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<PaginatedResponse<User>> {
        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Username.like(contains_pattern(search)))
                    .add(Column::Email.like(contains_pattern(search)))
                    .add(Column::DisplayName.like(contains_pattern(search))),
            );
        }

        if let Some(is_admin) = query.is_admin {
            select = select.filter(Column::IsAdmin.eq(is_admin));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, query.size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询用户总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询用户页数失败: {e}")))?;

        let users = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                FileDeskError::database_operation(format!("更新最后登录时间失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户信息（password 为已哈希的值）
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }

        if let Some(display_name) = update.display_name {
            let display_name = display_name.trim().to_string();
            model.display_name = Set((!display_name.is_empty()).then_some(display_name));
        }

        if let Some(is_admin) = update.is_admin {
            model.is_admin = Set(is_admin);
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("更新用户失败", e))?;

        self.get_user_by_id_impl(id).await
    }

    /// 删除用户
    /// 删除用户；其工作区、创建的文件夹和上传的文件随外键级联删除，
    /// 返回这些文件的磁盘名以便清理
    pub async fn delete_user_impl(&self, id: i64) -> Result<Option<RemovedBlobs>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("开启事务失败: {e}")))?;

        if Users::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询用户失败: {e}")))?
            .is_none()
        {
            return Ok(None);
        }

        let owned_workspaces: Vec<i64> = Workspaces::find()
            .select_only()
            .column(workspaces::Column::Id)
            .filter(workspaces::Column::OwnerId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区失败: {e}")))?;

        // 在别人工作区里创建的文件夹和文件转交给该工作区的所有者
        let foreign_folder_ws: Vec<i64> = Folders::find()
            .select_only()
            .column(folders::Column::WorkspaceId)
            .distinct()
            .filter(folders::Column::UserId.eq(id))
            .filter(folders::Column::WorkspaceId.is_not_in(owned_workspaces.clone()))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹失败: {e}")))?;
        let foreign_file_ws: Vec<i64> = Files::find()
            .select_only()
            .column(files::Column::WorkspaceId)
            .distinct()
            .filter(files::Column::UserId.eq(id))
            .filter(files::Column::WorkspaceId.is_not_in(owned_workspaces.clone()))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件失败: {e}")))?;

        let mut foreign_ws = foreign_folder_ws;
        foreign_ws.extend(foreign_file_ws);
        foreign_ws.sort_unstable();
        foreign_ws.dedup();

        let new_owners: Vec<(i64, i64)> = Workspaces::find()
            .select_only()
            .column(workspaces::Column::Id)
            .column(workspaces::Column::OwnerId)
            .filter(workspaces::Column::Id.is_in(foreign_ws))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区失败: {e}")))?;

        for (workspace_id, owner_id) in new_owners {
            Folders::update_many()
                .col_expr(folders::Column::UserId, Expr::value(owner_id))
                .filter(folders::Column::UserId.eq(id))
                .filter(folders::Column::WorkspaceId.eq(workspace_id))
                .exec(&txn)
                .await
                .map_err(|e| FileDeskError::database_operation(format!("转交文件夹失败: {e}")))?;
            Files::update_many()
                .col_expr(files::Column::UserId, Expr::value(owner_id))
                .filter(files::Column::UserId.eq(id))
                .filter(files::Column::WorkspaceId.eq(workspace_id))
                .exec(&txn)
                .await
                .map_err(|e| FileDeskError::database_operation(format!("转交文件失败: {e}")))?;
        }

        // 只有自己工作区里的文件会随级联删除
        let stored_names: Vec<String> = Files::find()
            .select_only()
            .column(files::Column::StoredName)
            .filter(files::Column::WorkspaceId.is_in(owned_workspaces))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询用户文件失败: {e}")))?;

        // 先删自己的工作区，删除用户时不再有记录引用它
        Workspaces::delete_many()
            .filter(workspaces::Column::OwnerId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除工作区失败: {e}")))?;

        Users::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除用户失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(RemovedBlobs { stored_names }))
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_user};
    use crate::models::users::requests::{CreateUserRequest, UpdateUserRequest, UserListQuery};

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let storage = memory_storage().await;
        seed_user(&storage, "alice").await;

        let err = storage
            .create_user_impl(CreateUserRequest {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password: "hashed".to_string(),
                display_name: None,
                is_admin: false,
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_list_filters_and_search() {
        let storage = memory_storage().await;
        seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob_100").await;
        storage
            .update_user_impl(
                bob.id,
                UpdateUserRequest {
                    email: None,
                    password: None,
                    display_name: Some("Bob Builder".to_string()),
                    is_admin: Some(true),
                    is_active: None,
                },
            )
            .await
            .unwrap();

        let admins = storage
            .list_users_with_pagination_impl(UserListQuery {
                page: 1,
                size: 10,
                is_admin: Some(true),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(admins.pagination.total, 1);
        assert_eq!(admins.items[0].username, "bob_100");

        let searched = storage
            .list_users_with_pagination_impl(UserListQuery {
                page: 1,
                size: 10,
                is_admin: None,
                search: Some("builder".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(searched.items.len(), 1);

        // 通配符按字面量匹配
        let wildcard = storage
            .list_users_with_pagination_impl(UserListQuery {
                page: 1,
                size: 10,
                is_admin: None,
                search: Some("%".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(wildcard.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_lookup_by_username_or_email() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;

        let by_email = storage
            .get_user_by_username_or_email_impl("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, alice.id);
        assert!(storage.update_last_login_impl(alice.id).await.unwrap());
        assert!(storage.get_user_by_id_impl(alice.id).await.unwrap().unwrap().last_login.is_some());
    }

    #[tokio::test]
    async fn test_delete_user_reports_owned_blobs() {
        use super::super::testing::seed_file;

        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob").await;
        let owned = seed_file(&storage, &alice, "mine.txt").await;
        let other = seed_file(&storage, &bob, "theirs.txt").await;

        let removed = storage.delete_user_impl(alice.id).await.unwrap().unwrap();
        assert_eq!(removed.stored_names, vec![owned.stored_name]);

        assert!(storage.get_file_by_id_impl(owned.id).await.unwrap().is_none());
        assert!(storage.get_file_by_id_impl(other.id).await.unwrap().is_some());
        assert!(storage.delete_user_impl(alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_uploader_hands_content_to_workspace_owner() {
        use super::super::testing::seed_file;
        use crate::models::files::entities::NewFile;
        use crate::models::folders::requests::CreateFolderRequest;

        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let admin = seed_user(&storage, "admin1").await;
        let own = seed_file(&storage, &alice, "notes.txt").await;

        let folder = storage
            .create_folder_impl(
                admin.id,
                CreateFolderRequest {
                    workspace_id: own.workspace_id,
                    parent_id: None,
                    name: "contracts".to_string(),
                    description: None,
                    labels: Vec::new(),
                },
            )
            .await
            .unwrap();
        let uploaded = storage
            .create_file_impl(NewFile {
                workspace_id: own.workspace_id,
                folder_id: Some(folder.id),
                user_id: admin.id,
                name: "alice-contract.pdf".to_string(),
                description: None,
                labels: Vec::new(),
                stored_name: "blob-x".to_string(),
                file_size: 1,
                content_type: "application/pdf".to_string(),
            })
            .await
            .unwrap();

        let removed = storage.delete_user_impl(admin.id).await.unwrap().unwrap();
        assert!(removed.stored_names.is_empty(), "{:?}", removed.stored_names);

        let kept_file = storage.get_file_by_id_impl(uploaded.id).await.unwrap().unwrap();
        assert_eq!(kept_file.user_id, alice.id);
        let kept_folder = storage.get_folder_by_id_impl(folder.id).await.unwrap().unwrap();
        assert_eq!(kept_folder.user_id, alice.id);
        assert!(storage.get_file_by_id_impl(own.id).await.unwrap().is_some());
    }
}
