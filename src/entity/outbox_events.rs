//! 发件箱事件实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "outbox_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_type: String,
    pub aggregate_type: String,
    pub aggregate_id: i64,
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub dispatched_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 未知的事件类型无法分发，返回 Err 由调用方标记失败
    pub fn into_outbox_event(self) -> Result<crate::models::outbox::OutboxEvent, String> {
        use super::to_datetime;
        use crate::models::outbox::{OutboxEvent, OutboxEventType, OutboxStatus};

        Ok(OutboxEvent {
            id: self.id,
            event_type: self.event_type.parse::<OutboxEventType>()?,
            aggregate_type: self.aggregate_type,
            aggregate_id: self.aggregate_id,
            payload: self.payload,
            status: self
                .status
                .parse::<OutboxStatus>()
                .unwrap_or(OutboxStatus::Pending),
            attempts: self.attempts,
            last_error: self.last_error,
            created_at: to_datetime(self.created_at),
            dispatched_at: self.dispatched_at.map(to_datetime),
        })
    }
}
