//! 事务性发件箱存储
//!
//! 事件与业务写入处于同一事务；分发时在一个事务内写入通知并标记事件，
//! 因此每个事件的通知最多落库一次。

use super::SeaOrmStorage;
use super::notifications::notification_model;
use crate::entity::outbox_events::{ActiveModel, Column, Entity as OutboxEvents};
use crate::errors::{FileDeskError, Result};
use crate::models::{
    approvals::entities::Approval,
    notifications::requests::CreateNotificationRequest,
    outbox::{ApprovalEventPayload, OutboxBacklog, OutboxEvent, OutboxEventType, OutboxStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::warn;

pub(super) const APPROVAL_AGGREGATE: &str = "approval";

/// 在调用方的事务内追加审批事件
pub(super) async fn append_approval_event<C: ConnectionTrait>(
    conn: &C,
    approval: &Approval,
    file_name: &str,
) -> Result<()> {
    let payload = serde_json::to_string(&ApprovalEventPayload::from_approval(approval, file_name))?;

    ActiveModel {
        event_type: Set(OutboxEventType::for_status(approval.status).to_string()),
        aggregate_type: Set(APPROVAL_AGGREGATE.to_string()),
        aggregate_id: Set(approval.id),
        payload: Set(payload),
        status: Set(OutboxStatus::Pending.to_string()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(chrono::Utc::now().timestamp()),
        dispatched_at: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| FileDeskError::database_operation(format!("写入发件箱事件失败: {e}")))?;

    Ok(())
}

impl SeaOrmStorage {
    pub async fn fetch_pending_outbox_events_impl(&self, limit: u64) -> Result<Vec<OutboxEvent>> {
        let rows = OutboxEvents::find()
            .filter(Column::Status.eq(OutboxStatus::Pending.to_string()))
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询发件箱失败: {e}")))?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match row.into_outbox_event() {
                Ok(event) => events.push(event),
                Err(reason) => {
                    // 无法识别的事件永远无法分发，直接置为失败
                    warn!("Outbox event {} is not dispatchable: {}", id, reason);
                    OutboxEvents::update_many()
                        .col_expr(Column::Status, Expr::value(OutboxStatus::Failed.to_string()))
                        .col_expr(Column::LastError, Expr::value(Some(reason)))
                        .filter(Column::Id.eq(id))
                        .exec(&self.db)
                        .await
                        .map_err(|e| {
                            FileDeskError::database_operation(format!("更新发件箱事件失败: {e}"))
                        })?;
                }
            }
        }

        Ok(events)
    }

    pub async fn dispatch_outbox_event_impl(
        &self,
        event_id: i64,
        notifications: Vec<CreateNotificationRequest>,
    ) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("开启事务失败: {e}")))?;

        let claimed = OutboxEvents::update_many()
            .col_expr(
                Column::Status,
                Expr::value(OutboxStatus::Dispatched.to_string()),
            )
            .col_expr(Column::DispatchedAt, Expr::value(Some(now)))
            .filter(Column::Id.eq(event_id))
            .filter(Column::Status.eq(OutboxStatus::Pending.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("标记发件箱事件失败: {e}")))?;

        if claimed.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| FileDeskError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        }

        for req in notifications {
            notification_model(req, now)
                .insert(&txn)
                .await
                .map_err(|e| FileDeskError::database_operation(format!("创建通知失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    pub async fn record_outbox_failure_impl(
        &self,
        event_id: i64,
        error: &str,
        max_attempts: i32,
    ) -> Result<OutboxStatus> {
        let event = OutboxEvents::find_by_id(event_id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询发件箱事件失败: {e}")))?
            .ok_or_else(|| FileDeskError::not_found(format!("Outbox event {event_id} not found")))?;

        let attempts = event.attempts + 1;
        let status = if attempts >= max_attempts {
            OutboxStatus::Failed
        } else {
            OutboxStatus::Pending
        };

        OutboxEvents::update_many()
            .col_expr(Column::Attempts, Expr::value(attempts))
            .col_expr(Column::LastError, Expr::value(Some(error.to_string())))
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .filter(Column::Id.eq(event_id))
            .exec(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("更新发件箱事件失败: {e}")))?;

        Ok(status)
    }

    pub async fn outbox_backlog_impl(&self) -> Result<OutboxBacklog> {
        let pending = OutboxEvents::find()
            .filter(Column::Status.eq(OutboxStatus::Pending.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("统计发件箱失败: {e}")))?;
        let failed = OutboxEvents::find()
            .filter(Column::Status.eq(OutboxStatus::Failed.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("统计发件箱失败: {e}")))?;

        Ok(OutboxBacklog { pending, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_file, seed_user};
    use super::*;
    use crate::models::approvals::requests::NewApproval;
    use crate::models::notifications::entities::NotificationType;

    fn notice(user_id: i64) -> CreateNotificationRequest {
        CreateNotificationRequest {
            user_id,
            notification_type: NotificationType::ApprovalRequested,
            title: "review".to_string(),
            content: None,
            link: Some("/approvals/1".to_string()),
            reference_type: Some("approval".to_string()),
            reference_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_dispatch_is_exactly_once() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob").await;
        let file = seed_file(&storage, &alice, "contract.pdf").await;

        storage
            .create_approval_impl(NewApproval {
                file_id: file.id,
                approver_id: bob.id,
                assigner_id: alice.id,
                request_note: Some("please".to_string()),
            })
            .await
            .unwrap();

        let events = storage.fetch_pending_outbox_events_impl(10).await.unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_type, OutboxEventType::ApprovalRequested);

        let payload: ApprovalEventPayload = serde_json::from_str(&event.payload).unwrap();
        assert_eq!(payload.file_name, "contract.pdf");
        assert_eq!(payload.note.as_deref(), Some("please"));

        assert!(
            storage
                .dispatch_outbox_event_impl(event.id, vec![notice(bob.id)])
                .await
                .unwrap()
        );
        assert!(
            !storage
                .dispatch_outbox_event_impl(event.id, vec![notice(bob.id)])
                .await
                .unwrap()
        );
        assert_eq!(
            storage
                .get_unread_notification_count_impl(bob.id)
                .await
                .unwrap(),
            1
        );
        assert!(
            storage
                .fetch_pending_outbox_events_impl(10)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_failures_exhaust_attempts() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob").await;
        let file = seed_file(&storage, &alice, "a.txt").await;
        storage
            .create_approval_impl(NewApproval {
                file_id: file.id,
                approver_id: bob.id,
                assigner_id: alice.id,
                request_note: None,
            })
            .await
            .unwrap();
        let event_id = storage.fetch_pending_outbox_events_impl(1).await.unwrap()[0].id;

        let first = storage
            .record_outbox_failure_impl(event_id, "boom", 2)
            .await
            .unwrap();
        assert_eq!(first, OutboxStatus::Pending);
        let second = storage
            .record_outbox_failure_impl(event_id, "boom", 2)
            .await
            .unwrap();
        assert_eq!(second, OutboxStatus::Failed);

        let backlog = storage.outbox_backlog_impl().await.unwrap();
        assert_eq!(backlog, OutboxBacklog { pending: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_failed_on_fetch() {
        let storage = memory_storage().await;
        ActiveModel {
            event_type: Set("file_exploded".to_string()),
            aggregate_type: Set(APPROVAL_AGGREGATE.to_string()),
            aggregate_id: Set(1),
            payload: Set("{}".to_string()),
            status: Set(OutboxStatus::Pending.to_string()),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(0),
            dispatched_at: Set(None),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap();

        assert!(
            storage
                .fetch_pending_outbox_events_impl(10)
                .await
                .unwrap()
                .is_empty()
        );
        let backlog = storage.outbox_backlog_impl().await.unwrap();
        assert_eq!(backlog.failed, 1);
    }
}
