//! 文件夹实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "folders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    // JSON 数组文本
    pub labels: String,
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
    #[sea_orm(has_many = "super::files::Entity")]
    Files,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_folder(self) -> crate::models::folders::entities::Folder {
        use super::to_datetime;
        use crate::models::common::labels::labels_from_db;
        use crate::models::folders::entities::Folder;

        Folder {
            id: self.id,
            workspace_id: self.workspace_id,
            user_id: self.user_id,
            parent_id: self.parent_id,
            name: self.name,
            description: self.description,
            labels: labels_from_db(&self.labels),
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
