//! 工作区存储操作

use super::SeaOrmStorage;
use crate::entity::prelude::{Approvals, Files, Folders};
use crate::entity::workspaces::{ActiveModel, Column, Entity as Workspaces};
use crate::entity::{approvals, files, folders};
use crate::errors::{FileDeskError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    workspaces::{
        entities::{RemovedBlobs, Workspace},
        requests::{CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceListQuery},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_workspace_impl(
        &self,
        owner_id: i64,
        req: CreateWorkspaceRequest,
    ) -> Result<Workspace> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            owner_id: Set(owner_id),
            name: Set(req.name),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("创建工作区失败", e))?;

        Ok(result.into_workspace())
    }

    pub async fn get_workspace_by_id_impl(&self, id: i64) -> Result<Option<Workspace>> {
        let result = Workspaces::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区失败: {e}")))?;

        Ok(result.map(|m| m.into_workspace()))
    }

    pub async fn list_workspaces_with_pagination_impl(
        &self,
        query: WorkspaceListQuery,
    ) -> Result<PaginatedResponse<Workspace>> {
        let mut select = Workspaces::find();

        if let Some(owner_id) = query.owner_id {
            select = select.filter(Column::OwnerId.eq(owner_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Name.like(contains_pattern(search.trim())));
        }

        select = select.order_by_asc(Column::Name).order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, query.size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区页数失败: {e}")))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_workspace()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn update_workspace_impl(
        &self,
        id: i64,
        update: UpdateWorkspaceRequest,
    ) -> Result<Option<Workspace>> {
        if self.get_workspace_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            // 空串表示清空
            model.description = Set(Some(description).filter(|d| !d.is_empty()));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("更新工作区失败", e))?;

        Ok(Some(result.into_workspace()))
    }

    /// 删除工作区：审批 -> 文件 -> 文件夹 -> 工作区，同一事务
    pub async fn delete_workspace_impl(&self, id: i64) -> Result<Option<RemovedBlobs>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("开启事务失败: {e}")))?;

        if Workspaces::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区失败: {e}")))?
            .is_none()
        {
            return Ok(None);
        }

        let file_rows: Vec<(i64, String)> = Files::find()
            .select_only()
            .column(files::Column::Id)
            .column(files::Column::StoredName)
            .filter(files::Column::WorkspaceId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询工作区文件失败: {e}")))?;

        let (file_ids, stored_names): (Vec<i64>, Vec<String>) = file_rows.into_iter().unzip();

        if !file_ids.is_empty() {
            Approvals::delete_many()
                .filter(approvals::Column::FileId.is_in(file_ids))
                .exec(&txn)
                .await
                .map_err(|e| FileDeskError::database_operation(format!("删除审批失败: {e}")))?;
        }

        Files::delete_many()
            .filter(files::Column::WorkspaceId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除文件失败: {e}")))?;

        Folders::delete_many()
            .filter(folders::Column::WorkspaceId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除文件夹失败: {e}")))?;

        Workspaces::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除工作区失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(RemovedBlobs { stored_names }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_user};
    use crate::models::files::entities::NewFile;
    use crate::models::folders::requests::CreateFolderRequest;
    use crate::models::workspaces::requests::{CreateWorkspaceRequest, WorkspaceListQuery};

    fn workspace(name: &str) -> CreateWorkspaceRequest {
        CreateWorkspaceRequest {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_name_unique_per_owner() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bobby").await;

        storage
            .create_workspace_impl(alice.id, workspace("Reports"))
            .await
            .unwrap();
        let err = storage
            .create_workspace_impl(alice.id, workspace("Reports"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // 其他用户可以使用同名工作区
        storage
            .create_workspace_impl(bob.id, workspace("Reports"))
            .await
            .unwrap();

        let own = storage
            .list_workspaces_with_pagination_impl(WorkspaceListQuery {
                page: 1,
                size: 20,
                owner_id: Some(alice.id),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(own.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_delete_workspace_removes_contents() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let ws = storage
            .create_workspace_impl(alice.id, workspace("Legal"))
            .await
            .unwrap();
        let folder = storage
            .create_folder_impl(
                alice.id,
                CreateFolderRequest {
                    workspace_id: ws.id,
                    parent_id: None,
                    name: "Contracts".to_string(),
                    description: None,
                    labels: vec![],
                },
            )
            .await
            .unwrap();
        let file = storage
            .create_file_impl(NewFile {
                workspace_id: ws.id,
                folder_id: Some(folder.id),
                user_id: alice.id,
                name: "nda.pdf".to_string(),
                description: None,
                labels: vec![],
                stored_name: "blob-nda.bin".to_string(),
                file_size: 10,
                content_type: "application/pdf".to_string(),
            })
            .await
            .unwrap();

        let removed = storage.delete_workspace_impl(ws.id).await.unwrap().unwrap();
        assert_eq!(removed.stored_names, vec!["blob-nda.bin".to_string()]);
        assert!(storage.get_file_by_id_impl(file.id).await.unwrap().is_none());
        assert!(storage.get_folder_by_id_impl(folder.id).await.unwrap().is_none());
        assert!(storage.delete_workspace_impl(ws.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_description_clears_it() {
        use crate::models::workspaces::requests::UpdateWorkspaceRequest;

        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let ws = storage
            .create_workspace_impl(
                alice.id,
                CreateWorkspaceRequest {
                    name: "Drafts".to_string(),
                    description: Some("old".to_string()),
                },
            )
            .await
            .unwrap();

        let kept = storage
            .update_workspace_impl(
                ws.id,
                UpdateWorkspaceRequest {
                    name: Some("Drafts 2".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("old"));

        let cleared = storage
            .update_workspace_impl(
                ws.id,
                UpdateWorkspaceRequest {
                    name: None,
                    description: Some(String::new()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.name, "Drafts 2");
    }
}
