//! 文件存储操作

use super::SeaOrmStorage;
use crate::entity::approvals;
use crate::entity::files::{ActiveModel, Column, Entity as Files};
use crate::entity::prelude::Approvals;
use crate::errors::{FileDeskError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    common::labels::labels_to_db,
    files::{
        entities::{FileEntry, NewFile},
        requests::{FileListQuery, FileUpdate},
    },
    folders::requests::ParentFilter,
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

impl SeaOrmStorage {
    /// 写入文件记录，下载 token 在此生成
    pub async fn create_file_impl(&self, file: NewFile) -> Result<FileEntry> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            workspace_id: Set(file.workspace_id),
            folder_id: Set(file.folder_id),
            user_id: Set(file.user_id),
            name: Set(file.name),
            description: Set(file.description),
            labels: Set(labels_to_db(&file.labels)),
            stored_name: Set(file.stored_name),
            file_size: Set(file.file_size),
            content_type: Set(file.content_type),
            download_token: Set(Uuid::new_v4().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("创建文件记录失败", e))?;

        Ok(result.into_file())
    }

    pub async fn get_file_by_id_impl(&self, id: i64) -> Result<Option<FileEntry>> {
        let result = Files::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件失败: {e}")))?;

        Ok(result.map(|m| m.into_file()))
    }

    pub async fn list_files_with_pagination_impl(
        &self,
        query: FileListQuery,
    ) -> Result<PaginatedResponse<FileEntry>> {
        let mut select = Files::find().filter(Column::WorkspaceId.eq(query.workspace_id));

        select = match query.folder {
            ParentFilter::Any => select,
            ParentFilter::Root => select.filter(Column::FolderId.is_null()),
            ParentFilter::Folder(folder_id) => select.filter(Column::FolderId.eq(folder_id)),
        };

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Name.like(contains_pattern(search.trim())));
        }

        // 标签以 JSON 数组存储，匹配带引号的完整元素
        if let Some(ref label) = query.label
            && !label.trim().is_empty()
        {
            let quoted = format!("\"{}\"", label.trim());
            select = select.filter(Column::Labels.like(contains_pattern(&quoted)));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, query.size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件页数失败: {e}")))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_file()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn update_file_impl(&self, id: i64, update: FileUpdate) -> Result<Option<FileEntry>> {
        if self.get_file_by_id_impl(id).await?.is_none() {
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

        if let Some(folder_id) = update.folder_id {
            model.folder_id = Set(folder_id);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| FileDeskError::from_db("更新文件失败", e))?;

        Ok(Some(result.into_file()))
    }

    pub async fn delete_file_impl(&self, id: i64) -> Result<Option<FileEntry>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(existing) = Files::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询文件失败: {e}")))?
        else {
            return Ok(None);
        };

        Approvals::delete_many()
            .filter(approvals::Column::FileId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除审批失败: {e}")))?;

        Files::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除文件失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(existing.into_file()))
    }

    pub async fn is_file_approver_impl(&self, file_id: i64, user_id: i64) -> Result<bool> {
        let count = Approvals::find()
            .filter(approvals::Column::FileId.eq(file_id))
            .filter(approvals::Column::ApproverId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询审批人失败: {e}")))?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_user};
    use crate::models::files::{
        entities::NewFile,
        requests::{FileListQuery, FileUpdate},
    };
    use crate::models::folders::requests::ParentFilter;
    use crate::models::workspaces::requests::CreateWorkspaceRequest;

    fn new_file(workspace_id: i64, user_id: i64, name: &str, labels: &[&str]) -> NewFile {
        NewFile {
            workspace_id,
            folder_id: None,
            user_id,
            name: name.to_string(),
            description: None,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            stored_name: format!("blob-{name}.bin"),
            file_size: 4,
            content_type: "text/plain".to_string(),
        }
    }

    #[tokio::test]
    async fn test_label_filter_matches_whole_labels() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let ws = storage
            .create_workspace_impl(
                alice.id,
                CreateWorkspaceRequest {
                    name: "Ops".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();

        storage
            .create_file_impl(new_file(ws.id, alice.id, "a.txt", &["draft", "legal"]))
            .await
            .unwrap();
        storage
            .create_file_impl(new_file(ws.id, alice.id, "b.txt", &["drafting"]))
            .await
            .unwrap();

        let drafts = storage
            .list_files_with_pagination_impl(FileListQuery {
                page: 1,
                size: 20,
                workspace_id: ws.id,
                folder: ParentFilter::Any,
                search: None,
                label: Some("draft".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(drafts.items.len(), 1);
        assert_eq!(drafts.items[0].name, "a.txt");
        assert!(!drafts.items[0].download_token.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_file() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let ws = storage
            .create_workspace_impl(
                alice.id,
                CreateWorkspaceRequest {
                    name: "Ops".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let file = storage
            .create_file_impl(new_file(ws.id, alice.id, "a.txt", &[]))
            .await
            .unwrap();

        let updated = storage
            .update_file_impl(
                file.id,
                FileUpdate {
                    name: Some("renamed.txt".to_string()),
                    labels: Some(vec!["final".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "renamed.txt");
        assert_eq!(updated.labels, vec!["final".to_string()]);
        assert_eq!(updated.download_token, file.download_token);

        let deleted = storage.delete_file_impl(file.id).await.unwrap().unwrap();
        assert_eq!(deleted.stored_name, "blob-a.txt.bin");
        assert!(storage.delete_file_impl(file.id).await.unwrap().is_none());
    }
}
