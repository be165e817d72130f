//! 文件夹存储操作

use super::SeaOrmStorage;
use crate::entity::folders::{ActiveModel, Column, Entity as Folders};
use crate::entity::prelude::{Approvals, Files};
use crate::entity::{approvals, files};
use crate::errors::{FileDeskError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    common::labels::labels_to_db,
    folders::{
        entities::Folder,
        requests::{CreateFolderRequest, FolderListQuery, ParentFilter, UpdateFolderRequest},
    },
    workspaces::entities::RemovedBlobs,
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_folder_impl(
        &self,
        user_id: i64,
        req: CreateFolderRequest,
    ) -> Result<Folder> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            workspace_id: Set(req.workspace_id),
            user_id: Set(user_id),
            parent_id: Set(req.parent_id),
            name: Set(req.name),
            description: Set(req.description),
            labels: Set(labels_to_db(&req.labels)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("创建文件夹失败", e))?;

        Ok(result.into_folder())
    }

    pub async fn get_folder_by_id_impl(&self, id: i64) -> Result<Option<Folder>> {
        let result = Folders::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹失败: {e}")))?;

        Ok(result.map(|m| m.into_folder()))
    }

    pub async fn find_sibling_folder_impl(
        &self,
        workspace_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> Result<Option<Folder>> {
        let mut select = Folders::find()
            .filter(Column::WorkspaceId.eq(workspace_id))
            .filter(Column::Name.eq(name));

        select = match parent_id {
            Some(parent_id) => select.filter(Column::ParentId.eq(parent_id)),
            None => select.filter(Column::ParentId.is_null()),
        };

        let result = select
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹失败: {e}")))?;

        Ok(result.map(|m| m.into_folder()))
    }

    pub async fn list_folders_with_pagination_impl(
        &self,
        query: FolderListQuery,
    ) -> Result<PaginatedResponse<Folder>> {
        let mut select = Folders::find().filter(Column::WorkspaceId.eq(query.workspace_id));

        select = match query.parent {
            ParentFilter::Any => select,
            ParentFilter::Root => select.filter(Column::ParentId.is_null()),
            ParentFilter::Folder(parent_id) => select.filter(Column::ParentId.eq(parent_id)),
        };

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
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹页数失败: {e}")))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_folder()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    /// 更新文件夹；labels 应已规范化，移动目标已由调用方校验
    pub async fn update_folder_impl(
        &self,
        id: i64,
        update: UpdateFolderRequest,
    ) -> Result<Option<Folder>> {
        if self.get_folder_by_id_impl(id).await?.is_none() {
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

        if let Some(labels) = update.labels {
            model.labels = Set(labels_to_db(&labels));
        }

        if let Some(parent_id) = update.parent_id {
            model.parent_id = Set(parent_id);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("更新文件夹失败", e))?;

        Ok(Some(result.into_folder()))
    }

    pub async fn folder_has_children_impl(&self, id: i64) -> Result<bool> {
        let folders = Folders::find()
            .filter(Column::ParentId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("统计子文件夹失败: {e}")))?;
        if folders > 0 {
            return Ok(true);
        }

        let files = Files::find()
            .filter(files::Column::FolderId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("统计文件失败: {e}")))?;

        Ok(files > 0)
    }

    /// 删除文件夹子树：审批 -> 文件 -> 文件夹，同一事务
    pub async fn delete_folder_impl(&self, id: i64) -> Result<Option<RemovedBlobs>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("开启事务失败: {e}")))?;

        if Folders::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹失败: {e}")))?
            .is_none()
        {
            return Ok(None);
        }

        let folder_ids = collect_subtree(&txn, vec![id]).await?;

        let file_rows: Vec<(i64, String)> = Files::find()
            .select_only()
            .column(files::Column::Id)
            .column(files::Column::StoredName)
            .filter(files::Column::FolderId.is_in(folder_ids.clone()))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件夹文件失败: {e}")))?;

        let (file_ids, stored_names): (Vec<i64>, Vec<String>) = file_rows.into_iter().unzip();

        if !file_ids.is_empty() {
            Approvals::delete_many()
                .filter(approvals::Column::FileId.is_in(file_ids.clone()))
                .exec(&txn)
                .await
                .map_err(|e| FileDeskError::database_operation(format!("删除审批失败: {e}")))?;

            Files::delete_many()
                .filter(files::Column::Id.is_in(file_ids))
                .exec(&txn)
                .await
                .map_err(|e| FileDeskError::database_operation(format!("删除文件失败: {e}")))?;
        }

        // 子节点先删，避免依赖外键级联
        for folder_id in folder_ids.iter().rev() {
            Folders::delete_by_id(*folder_id)
                .exec(&txn)
                .await
                .map_err(|e| FileDeskError::database_operation(format!("删除文件夹失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(RemovedBlobs { stored_names }))
    }
}

/// 广度优先收集子树 id，父节点总在子节点之前
pub(super) async fn collect_subtree<C: ConnectionTrait>(
    conn: &C,
    roots: Vec<i64>,
) -> Result<Vec<i64>> {
    let mut ids = roots.clone();
    let mut frontier = roots;

    while !frontier.is_empty() {
        let children: Vec<i64> = Folders::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::ParentId.is_in(frontier))
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询子文件夹失败: {e}")))?;

        ids.extend(children.iter().copied());
        frontier = children;
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_user};
    use crate::models::files::entities::NewFile;
    use crate::models::folders::requests::{
        CreateFolderRequest, FolderListQuery, ParentFilter, UpdateFolderRequest,
    };
    use crate::models::workspaces::requests::CreateWorkspaceRequest;

    fn folder(workspace_id: i64, parent_id: Option<i64>, name: &str) -> CreateFolderRequest {
        CreateFolderRequest {
            workspace_id,
            parent_id,
            name: name.to_string(),
            description: None,
            labels: vec!["q3".to_string()],
        }
    }

    #[tokio::test]
    async fn test_subtree_delete_and_children() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let ws = storage
            .create_workspace_impl(
                alice.id,
                CreateWorkspaceRequest {
                    name: "Finance".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let root = storage
            .create_folder_impl(alice.id, folder(ws.id, None, "2026"))
            .await
            .unwrap();
        let child = storage
            .create_folder_impl(alice.id, folder(ws.id, Some(root.id), "Q1"))
            .await
            .unwrap();
        let grandchild = storage
            .create_folder_impl(alice.id, folder(ws.id, Some(child.id), "Invoices"))
            .await
            .unwrap();
        storage
            .create_file_impl(NewFile {
                workspace_id: ws.id,
                folder_id: Some(grandchild.id),
                user_id: alice.id,
                name: "inv-1.pdf".to_string(),
                description: None,
                labels: vec![],
                stored_name: "blob-inv-1.bin".to_string(),
                file_size: 3,
                content_type: "application/pdf".to_string(),
            })
            .await
            .unwrap();

        assert!(storage.folder_has_children_impl(root.id).await.unwrap());
        assert!(storage.folder_has_children_impl(grandchild.id).await.unwrap());

        let roots = storage
            .list_folders_with_pagination_impl(FolderListQuery {
                page: 1,
                size: 20,
                workspace_id: ws.id,
                parent: ParentFilter::Root,
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(roots.items.len(), 1);
        assert_eq!(roots.items[0].labels, vec!["q3".to_string()]);

        let removed = storage.delete_folder_impl(root.id).await.unwrap().unwrap();
        assert_eq!(removed.stored_names, vec!["blob-inv-1.bin".to_string()]);
        assert!(storage.get_folder_by_id_impl(grandchild.id).await.unwrap().is_none());
        assert!(storage.get_workspace_by_id_impl(ws.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_move_to_root_and_sibling_lookup() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let ws = storage
            .create_workspace_impl(
                alice.id,
                CreateWorkspaceRequest {
                    name: "Docs".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let parent = storage
            .create_folder_impl(alice.id, folder(ws.id, None, "Drafts"))
            .await
            .unwrap();
        let child = storage
            .create_folder_impl(alice.id, folder(ws.id, Some(parent.id), "Old"))
            .await
            .unwrap();

        assert!(
            storage
                .find_sibling_folder_impl(ws.id, None, "Old")
                .await
                .unwrap()
                .is_none()
        );

        let moved = storage
            .update_folder_impl(
                child.id,
                UpdateFolderRequest {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.parent_id, None);
        assert!(
            storage
                .find_sibling_folder_impl(ws.id, None, "Old")
                .await
                .unwrap()
                .is_some()
        );
    }
}
