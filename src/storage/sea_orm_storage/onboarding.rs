//! 新手引导状态存储

use super::SeaOrmStorage;
use crate::entity::onboarding_statuses::{ActiveModel, Entity as OnboardingStatuses};
use crate::errors::{FileDeskError, Result};
use crate::models::onboarding::OnboardingStatus;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 没有记录时视为未完成
    pub async fn get_onboarding_status_impl(&self, user_id: i64) -> Result<OnboardingStatus> {
        let result = OnboardingStatuses::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询引导状态失败: {e}")))?;

        Ok(result
            .map(|m| m.into_onboarding_status())
            .unwrap_or_default())
    }

    pub async fn upsert_onboarding_status_impl(
        &self,
        user_id: i64,
        completed: bool,
    ) -> Result<OnboardingStatus> {
        let now = chrono::Utc::now().timestamp();
        let existing = OnboardingStatuses::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询引导状态失败: {e}")))?;

        let completed_at = match (&existing, completed) {
            // 重复完成时保留首次完成时间
            (Some(m), true) if m.completed => m.completed_at,
            (_, true) => Some(now),
            (_, false) => None,
        };

        let model = ActiveModel {
            user_id: Set(user_id),
            completed: Set(completed),
            completed_at: Set(completed_at),
            updated_at: Set(now),
        };

        let result = if existing.is_some() {
            model.update(&self.db).await
        } else {
            model.insert(&self.db).await
        }
        .map_err(|e| FileDeskError::database_operation(format!("保存引导状态失败: {e}")))?;

        Ok(result.into_onboarding_status())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_user};

    #[tokio::test]
    async fn test_upsert_onboarding_status() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;

        let initial = storage.get_onboarding_status_impl(alice.id).await.unwrap();
        assert!(!initial.completed);
        assert!(initial.completed_at.is_none());

        let done = storage
            .upsert_onboarding_status_impl(alice.id, true)
            .await
            .unwrap();
        assert!(done.completed);
        let first_completed_at = done.completed_at;
        assert!(first_completed_at.is_some());

        let again = storage
            .upsert_onboarding_status_impl(alice.id, true)
            .await
            .unwrap();
        assert_eq!(again.completed_at, first_completed_at);

        let reset = storage
            .upsert_onboarding_status_impl(alice.id, false)
            .await
            .unwrap();
        assert!(!reset.completed);
        assert!(reset.completed_at.is_none());
    }
}
