//! 通知存储操作

use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{FileDeskError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// 构造待插入的通知行，发件箱分发在事务内复用
pub(super) fn notification_model(req: CreateNotificationRequest, now: i64) -> ActiveModel {
    ActiveModel {
        user_id: Set(req.user_id),
        notification_type: Set(req.notification_type.to_string()),
        title: Set(req.title),
        content: Set(req.content),
        link: Set(req.link),
        reference_type: Set(req.reference_type),
        reference_id: Set(req.reference_id),
        is_read: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
}

impl SeaOrmStorage {
    /// 创建通知
    pub async fn create_notification_impl(
        &self,
        req: CreateNotificationRequest,
    ) -> Result<Notification> {
        let result = notification_model(req, chrono::Utc::now().timestamp())
            .insert(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("创建通知失败: {e}")))?;

        Ok(result.into_notification())
    }

    /// 列出用户通知（分页）
    pub async fn list_notifications_with_pagination_impl(
        &self,
        query: NotificationListQuery,
    ) -> Result<PaginatedResponse<Notification>> {
        let mut select = Notifications::find().filter(Column::UserId.eq(query.user_id));

        if query.unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, query.size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询通知总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询通知页数失败: {e}")))?;

        let notifications = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询通知列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: notifications
                .into_iter()
                .map(|m| m.into_notification())
                .collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    /// 获取用户未读通知数量
    pub async fn get_unread_notification_count_impl(&self, user_id: i64) -> Result<i64> {
        let count = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询未读通知数量失败: {e}")))?;

        Ok(count as i64)
    }

    /// 标记通知为已读，只作用于本人的通知
    pub async fn mark_notification_as_read_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 标记用户所有通知为已读
    pub async fn mark_all_notifications_as_read_impl(&self, user_id: i64) -> Result<i64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("标记全部通知已读失败: {e}")))?;

        Ok(result.rows_affected as i64)
    }

    /// 删除通知
    pub async fn delete_notification_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = Notifications::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("删除通知失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_user};
    use crate::models::notifications::{
        entities::NotificationType,
        requests::{CreateNotificationRequest, NotificationListQuery},
    };

    fn system_notice(user_id: i64, title: &str) -> CreateNotificationRequest {
        CreateNotificationRequest {
            user_id,
            notification_type: NotificationType::System,
            title: title.to_string(),
            content: None,
            link: None,
            reference_type: None,
            reference_id: None,
        }
    }

    #[tokio::test]
    async fn test_read_state_is_scoped_to_owner() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob").await;

        let first = storage
            .create_notification_impl(system_notice(alice.id, "one"))
            .await
            .unwrap();
        storage
            .create_notification_impl(system_notice(alice.id, "two"))
            .await
            .unwrap();

        assert!(
            !storage
                .mark_notification_as_read_impl(first.id, bob.id)
                .await
                .unwrap()
        );
        assert!(
            storage
                .mark_notification_as_read_impl(first.id, alice.id)
                .await
                .unwrap()
        );
        assert_eq!(
            storage
                .get_unread_notification_count_impl(alice.id)
                .await
                .unwrap(),
            1
        );

        let unread = storage
            .list_notifications_with_pagination_impl(NotificationListQuery {
                page: 1,
                size: 10,
                user_id: alice.id,
                unread_only: true,
            })
            .await
            .unwrap();
        assert_eq!(unread.items.len(), 1);
        assert_eq!(unread.items[0].title, "two");

        assert_eq!(
            storage
                .mark_all_notifications_as_read_impl(alice.id)
                .await
                .unwrap(),
            1
        );
        assert!(!storage.delete_notification_impl(first.id, bob.id).await.unwrap());
        assert!(storage.delete_notification_impl(first.id, alice.id).await.unwrap());
    }
}
