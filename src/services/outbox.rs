//! 发件箱分发器
//!
//! 后台任务按 id 顺序读取待分发事件，渲染成通知后在同一事务内写入通知并
//! 标记事件已分发。审批写入后通过 [`OutboxNotifier`] 立即唤醒，空闲时按
//! `outbox.poll_interval_ms` 轮询。

use actix_web::{HttpRequest, web};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::OutboxConfig;
use crate::errors::Result;
use crate::models::approvals::entities::ApprovalStatus;
use crate::models::notifications::{
    entities::NotificationType, requests::CreateNotificationRequest,
};
use crate::models::outbox::{ApprovalEventPayload, OutboxEvent, OutboxEventType, OutboxStatus};
use crate::storage::Storage;

/// 唤醒分发器的句柄，可在多个 worker 间共享
#[derive(Clone, Default)]
pub struct OutboxNotifier(Arc<Notify>);

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(&self) {
        self.0.notify_one();
    }

    async fn notified(&self) {
        self.0.notified().await;
    }
}

/// 从请求上下文唤醒分发器；未注册时不做任何事
pub fn wake_outbox(request: &HttpRequest) {
    if let Some(notifier) = request.app_data::<web::Data<OutboxNotifier>>() {
        notifier.wake();
    }
}

/// 把一个事件渲染为要写入的通知
pub fn render_notifications(
    event: &OutboxEvent,
) -> std::result::Result<Vec<CreateNotificationRequest>, String> {
    let payload: ApprovalEventPayload = serde_json::from_str(&event.payload)
        .map_err(|e| format!("Invalid payload for event {}: {e}", event.id))?;

    let expected = OutboxEventType::for_status(payload.status);
    if expected != event.event_type {
        return Err(format!(
            "Event {} is {} but payload status is {}",
            event.id, event.event_type, payload.status
        ));
    }

    let (recipient, notification_type, title) = match payload.status {
        ApprovalStatus::Pending => (
            payload.approver_id,
            NotificationType::ApprovalRequested,
            "Approval requested",
        ),
        ApprovalStatus::Approved => (
            payload.assigner_id,
            NotificationType::ApprovalApproved,
            "Approval approved",
        ),
        ApprovalStatus::Rejected => (
            payload.assigner_id,
            NotificationType::ApprovalRejected,
            "Approval rejected",
        ),
        ApprovalStatus::Withdrawn => (
            payload.approver_id,
            NotificationType::ApprovalWithdrawn,
            "Approval withdrawn",
        ),
    };

    let content = match &payload.note {
        Some(note) => format!("{}: {}", payload.file_name, note),
        None => payload.file_name.clone(),
    };

    Ok(vec![CreateNotificationRequest {
        user_id: recipient,
        notification_type,
        title: title.to_string(),
        content: Some(content),
        link: Some(format!("/approvals/{}", payload.approval_id)),
        reference_type: Some("approval".to_string()),
        reference_id: Some(payload.approval_id),
    }])
}

pub struct OutboxDispatcher {
    storage: Arc<dyn Storage>,
    notifier: OutboxNotifier,
    config: OutboxConfig,
}

impl OutboxDispatcher {
    pub fn new(storage: Arc<dyn Storage>, notifier: OutboxNotifier, config: OutboxConfig) -> Self {
        Self {
            storage,
            notifier,
            config,
        }
    }

    /// 处理一批待分发事件，返回成功分发的数量
    pub async fn run_once(&self) -> Result<usize> {
        let events = self
            .storage
            .fetch_pending_outbox_events(self.config.batch_size)
            .await?;

        let mut dispatched = 0;
        for event in events {
            let outcome = match render_notifications(&event) {
                Ok(notifications) => self
                    .storage
                    .dispatch_outbox_event(event.id, notifications)
                    .await
                    .map_err(|e| e.to_string()),
                Err(msg) => Err(msg),
            };

            match outcome {
                Ok(true) => dispatched += 1,
                // 已被其他实例处理
                Ok(false) => debug!("Outbox event {} already claimed", event.id),
                Err(msg) => {
                    let status = self
                        .storage
                        .record_outbox_failure(event.id, &msg, self.config.max_attempts)
                        .await?;
                    if status == OutboxStatus::Failed {
                        error!("Outbox event {} failed permanently: {}", event.id, msg);
                    } else {
                        warn!("Outbox event {} dispatch failed: {}", event.id, msg);
                    }
                }
            }
        }

        Ok(dispatched)
    }

    /// 一直处理到没有待分发事件为止
    async fn drain(&self) {
        loop {
            match self.run_once().await {
                Ok(0) => return,
                Ok(n) => debug!("Dispatched {} outbox events", n),
                Err(e) => {
                    error!("Outbox dispatch round failed: {}", e);
                    return;
                }
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms.max(10)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(
                "Outbox dispatcher started (poll {} ms, batch {})",
                self.config.poll_interval_ms, self.config.batch_size
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = self.notifier.notified() => {}
                }
                self.drain().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::approvals::requests::{ApprovalDecision, NewApproval};
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_file, seed_user};

    fn event(event_type: OutboxEventType, payload: &ApprovalEventPayload) -> OutboxEvent {
        OutboxEvent {
            id: 7,
            event_type,
            aggregate_type: "approval".to_string(),
            aggregate_id: payload.approval_id,
            payload: serde_json::to_string(payload).unwrap(),
            status: OutboxStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: chrono::Utc::now(),
            dispatched_at: None,
        }
    }

    fn payload(status: ApprovalStatus) -> ApprovalEventPayload {
        ApprovalEventPayload {
            approval_id: 3,
            file_id: 4,
            file_name: "budget.xlsx".to_string(),
            approver_id: 10,
            assigner_id: 20,
            status,
            version: 1,
            note: Some("please check".to_string()),
        }
    }

    #[test]
    fn test_recipients_follow_the_workflow() {
        let cases = [
            (ApprovalStatus::Pending, 10, NotificationType::ApprovalRequested),
            (ApprovalStatus::Approved, 20, NotificationType::ApprovalApproved),
            (ApprovalStatus::Rejected, 20, NotificationType::ApprovalRejected),
            (ApprovalStatus::Withdrawn, 10, NotificationType::ApprovalWithdrawn),
        ];
        for (status, recipient, kind) in cases {
            let p = payload(status);
            let rendered = render_notifications(&event(OutboxEventType::for_status(status), &p))
                .unwrap();
            assert_eq!(rendered.len(), 1);
            assert_eq!(rendered[0].user_id, recipient);
            assert_eq!(rendered[0].notification_type, kind);
            assert_eq!(rendered[0].link.as_deref(), Some("/approvals/3"));
            assert_eq!(rendered[0].reference_type.as_deref(), Some("approval"));
        }
    }

    #[test]
    fn test_mismatched_or_broken_payload_is_rejected() {
        let p = payload(ApprovalStatus::Approved);
        assert!(render_notifications(&event(OutboxEventType::ApprovalRequested, &p)).is_err());

        let mut broken = event(OutboxEventType::ApprovalApproved, &p);
        broken.payload = "{".to_string();
        assert!(render_notifications(&broken).is_err());
    }

    #[tokio::test]
    async fn test_run_once_delivers_each_event_once() {
        let storage = Arc::new(memory_storage().await);
        let assigner = seed_user(&storage, "assigner1").await;
        let approver = seed_user(&storage, "approver1").await;
        let file = seed_file(&storage, &assigner, "plan.pdf").await;

        let approval = storage
            .create_approval(NewApproval {
                file_id: file.id,
                approver_id: approver.id,
                assigner_id: assigner.id,
                request_note: None,
            })
            .await
            .unwrap();
        storage
            .decide_approval(ApprovalDecision {
                approval_id: approval.id,
                expected_version: 1,
                target: ApprovalStatus::Approved,
                remarks: Some("ok".to_string()),
            })
            .await
            .unwrap();

        let dispatcher = OutboxDispatcher::new(
            storage.clone(),
            OutboxNotifier::new(),
            OutboxConfig::default(),
        );
        assert_eq!(dispatcher.run_once().await.unwrap(), 2);
        assert_eq!(dispatcher.run_once().await.unwrap(), 0);

        let inbox = |user_id| NotificationListQuery {
            page: 1,
            size: 10,
            user_id,
            unread_only: false,
        };
        let to_approver = storage
            .list_notifications_with_pagination(inbox(approver.id))
            .await
            .unwrap();
        let to_assigner = storage
            .list_notifications_with_pagination(inbox(assigner.id))
            .await
            .unwrap();
        assert_eq!(to_approver.items.len(), 1);
        assert_eq!(
            to_approver.items[0].notification_type,
            NotificationType::ApprovalRequested
        );
        assert_eq!(to_assigner.items.len(), 1);
        assert_eq!(
            to_assigner.items[0].notification_type,
            NotificationType::ApprovalApproved
        );

        let backlog = storage.outbox_backlog().await.unwrap();
        assert_eq!(backlog.pending, 0);
        assert_eq!(backlog.failed, 0);
    }
}
