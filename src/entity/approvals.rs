//! 审批实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "approvals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub file_id: i64,
    pub approver_id: i64,
    pub assigner_id: i64,
    pub status: String,
    pub request_note: Option<String>,
    pub remarks: Option<String>,
    pub version: i32,
    // 仅在 pending 时等于 file_id
    #[sea_orm(unique)]
    pub pending_file_id: Option<i64>,
    pub requested_at: i64,
    pub decided_at: Option<i64>,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::files::Entity",
        from = "Column::FileId",
        to = "super::files::Column::Id"
    )]
    File,
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_approval(self) -> crate::models::approvals::entities::Approval {
        use super::to_datetime;
        use crate::models::approvals::entities::{Approval, ApprovalStatus};

        Approval {
            id: self.id,
            file_id: self.file_id,
            approver_id: self.approver_id,
            assigner_id: self.assigner_id,
            status: self
                .status
                .parse::<ApprovalStatus>()
                .unwrap_or(ApprovalStatus::Pending),
            request_note: self.request_note,
            remarks: self.remarks,
            version: self.version,
            requested_at: to_datetime(self.requested_at),
            decided_at: self.decided_at.map(to_datetime),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
