//! 文件实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: i64,
    pub folder_id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub labels: String,
    #[sea_orm(unique)]
    pub stored_name: String,
    pub file_size: i64,
    pub content_type: String,
    #[sea_orm(unique)]
    pub download_token: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id"
    )]
    Workspace,
    #[sea_orm(
        belongs_to = "super::folders::Entity",
        from = "Column::FolderId",
        to = "super::folders::Column::Id"
    )]
    Folder,
    #[sea_orm(has_many = "super::approvals::Entity")]
    Approvals,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::folders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Folder.def()
    }
}

impl Related<super::approvals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_file(self) -> crate::models::files::entities::FileEntry {
        use super::to_datetime;
        use crate::models::common::labels::labels_from_db;
        use crate::models::files::entities::FileEntry;

        FileEntry {
            id: self.id,
            workspace_id: self.workspace_id,
            folder_id: self.folder_id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            labels: labels_from_db(&self.labels),
            stored_name: self.stored_name,
            file_size: self.file_size,
            content_type: self.content_type,
            download_token: self.download_token,
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
