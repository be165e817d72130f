//! 审批存储操作

use super::SeaOrmStorage;
use super::outbox::append_approval_event;
use crate::entity::approvals::{ActiveModel, Column, Entity as Approvals};
use crate::entity::prelude::Files;
use crate::errors::{FileDeskError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    approvals::{
        entities::{Approval, ApprovalStatus, DecisionOutcome},
        requests::{ApprovalDecision, ApprovalListQuery, ApprovalRole, NewApproval},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};

async fn file_name_of<C: ConnectionTrait>(conn: &C, file_id: i64) -> Result<Option<String>> {
    let file = Files::find_by_id(file_id)
        .one(conn)
        .await
        .map_err(|e| FileDeskError::database_operation(format!("查询文件失败: {e}")))?;
    Ok(file.map(|f| f.name))
}

impl SeaOrmStorage {
    /// 新建待审批记录，同一文件同时只能有一个 pending 审批
    pub async fn create_approval_impl(&self, req: NewApproval) -> Result<Approval> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("开启事务失败: {e}")))?;

        let file_name = file_name_of(&txn, req.file_id)
            .await?
            .ok_or_else(|| FileDeskError::not_found(format!("File {} not found", req.file_id)))?;

        let model = ActiveModel {
            file_id: Set(req.file_id),
            approver_id: Set(req.approver_id),
            assigner_id: Set(req.assigner_id),
            status: Set(ApprovalStatus::Pending.to_string()),
            request_note: Set(req.request_note),
            remarks: Set(None),
            version: Set(1),
            pending_file_id: Set(Some(req.file_id)),
            requested_at: Set(now),
            decided_at: Set(None),
            updated_at: Set(now),
            ..Default::default()
        };

        let approval = model
            .insert(&txn)
            .await
            .map_err(|e| FileDeskError::from_db("文件已有待处理的审批", e))?
            .into_approval();

        append_approval_event(&txn, &approval, &file_name).await?;

        txn.commit()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(approval)
    }

    pub async fn get_approval_by_id_impl(&self, id: i64) -> Result<Option<Approval>> {
        let result = Approvals::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询审批失败: {e}")))?;

        Ok(result.map(|m| m.into_approval()))
    }

    /// 以 (id, version, pending) 为条件更新；条件不满足时返回当前记录
    pub async fn decide_approval_impl(&self, decision: ApprovalDecision) -> Result<DecisionOutcome> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("开启事务失败: {e}")))?;

        let updated = Approvals::update_many()
            .col_expr(Column::Status, Expr::value(decision.target.to_string()))
            .col_expr(Column::Version, Expr::value(decision.expected_version + 1))
            .col_expr(Column::PendingFileId, Expr::value(Option::<i64>::None))
            .col_expr(Column::Remarks, Expr::value(decision.remarks.clone()))
            .col_expr(Column::DecidedAt, Expr::value(Some(now)))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(decision.approval_id))
            .filter(Column::Version.eq(decision.expected_version))
            .filter(Column::Status.eq(ApprovalStatus::Pending.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("更新审批失败: {e}")))?;

        let current = Approvals::find_by_id(decision.approval_id)
            .one(&txn)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询审批失败: {e}")))?
            .ok_or_else(|| {
                FileDeskError::not_found(format!("Approval {} not found", decision.approval_id))
            })?
            .into_approval();

        if updated.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| FileDeskError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(DecisionOutcome::Stale(current));
        }

        let file_name = file_name_of(&txn, current.file_id)
            .await?
            .unwrap_or_default();
        append_approval_event(&txn, &current, &file_name).await?;

        txn.commit()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(DecisionOutcome::Applied(current))
    }

    pub async fn list_approvals_with_pagination_impl(
        &self,
        query: ApprovalListQuery,
    ) -> Result<PaginatedResponse<Approval>> {
        let mut select = Approvals::find();

        select = match query.role {
            Some(ApprovalRole::Approver) => select.filter(Column::ApproverId.eq(query.user_id)),
            Some(ApprovalRole::Assigner) => select.filter(Column::AssignerId.eq(query.user_id)),
            None => select.filter(
                Condition::any()
                    .add(Column::ApproverId.eq(query.user_id))
                    .add(Column::AssignerId.eq(query.user_id)),
            ),
        };

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        if let Some(file_id) = query.file_id {
            select = select.filter(Column::FileId.eq(file_id));
        }

        select = select.order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, query.size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询审批总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询审批页数失败: {e}")))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| FileDeskError::database_operation(format!("查询审批列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_approval()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{memory_storage, seed_file, seed_user};
    use crate::models::approvals::{
        entities::{ApprovalStatus, DecisionOutcome},
        requests::{ApprovalDecision, ApprovalListQuery, ApprovalRole, NewApproval},
    };

    fn request(file_id: i64, approver_id: i64, assigner_id: i64) -> NewApproval {
        NewApproval {
            file_id,
            approver_id,
            assigner_id,
            request_note: None,
        }
    }

    #[tokio::test]
    async fn test_decide_bumps_version_and_appends_event() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob").await;
        let file = seed_file(&storage, &alice, "a.txt").await;

        let approval = storage
            .create_approval_impl(request(file.id, bob.id, alice.id))
            .await
            .unwrap();
        assert_eq!(approval.status, ApprovalStatus::Pending);
        assert_eq!(approval.version, 1);

        let outcome = storage
            .decide_approval_impl(ApprovalDecision {
                approval_id: approval.id,
                expected_version: 1,
                target: ApprovalStatus::Approved,
                remarks: Some("ok".to_string()),
            })
            .await
            .unwrap();

        let DecisionOutcome::Applied(decided) = outcome else {
            panic!("expected the decision to apply");
        };
        assert_eq!(decided.status, ApprovalStatus::Approved);
        assert_eq!(decided.version, 2);
        assert_eq!(decided.remarks.as_deref(), Some("ok"));
        assert!(decided.decided_at.is_some());

        let backlog = storage.outbox_backlog_impl().await.unwrap();
        assert_eq!(backlog.pending, 2);
    }

    #[tokio::test]
    async fn test_stale_version_returns_current() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob").await;
        let file = seed_file(&storage, &alice, "a.txt").await;
        let approval = storage
            .create_approval_impl(request(file.id, bob.id, alice.id))
            .await
            .unwrap();

        let decide = |target| ApprovalDecision {
            approval_id: approval.id,
            expected_version: 1,
            target,
            remarks: None,
        };

        storage
            .decide_approval_impl(decide(ApprovalStatus::Rejected))
            .await
            .unwrap();
        let second = storage
            .decide_approval_impl(decide(ApprovalStatus::Approved))
            .await
            .unwrap();

        let DecisionOutcome::Stale(current) = second else {
            panic!("second decision must be stale");
        };
        assert_eq!(current.status, ApprovalStatus::Rejected);
        assert_eq!(current.version, 2);
        // 失败的决定不产生事件
        assert_eq!(storage.outbox_backlog_impl().await.unwrap().pending, 2);
    }

    #[tokio::test]
    async fn test_single_pending_approval_per_file() {
        let storage = memory_storage().await;
        let alice = seed_user(&storage, "alice").await;
        let bob = seed_user(&storage, "bob").await;
        let carol = seed_user(&storage, "carol").await;
        let file = seed_file(&storage, &alice, "a.txt").await;

        let first = storage
            .create_approval_impl(request(file.id, bob.id, alice.id))
            .await
            .unwrap();
        let duplicate = storage
            .create_approval_impl(request(file.id, carol.id, alice.id))
            .await
            .unwrap_err();
        assert!(duplicate.is_conflict());

        storage
            .decide_approval_impl(ApprovalDecision {
                approval_id: first.id,
                expected_version: 1,
                target: ApprovalStatus::Withdrawn,
                remarks: None,
            })
            .await
            .unwrap();

        // 终态后可以重新发起
        let again = storage
            .create_approval_impl(request(file.id, carol.id, alice.id))
            .await
            .unwrap();
        assert_eq!(again.version, 1);

        let for_carol = storage
            .list_approvals_with_pagination_impl(ApprovalListQuery {
                page: 1,
                size: 10,
                user_id: carol.id,
                role: Some(ApprovalRole::Approver),
                status: Some(ApprovalStatus::Pending),
                file_id: None,
            })
            .await
            .unwrap();
        assert_eq!(for_carol.items.len(), 1);

        let involving_alice = storage
            .list_approvals_with_pagination_impl(ApprovalListQuery {
                page: 1,
                size: 10,
                user_id: alice.id,
                role: None,
                status: None,
                file_id: Some(file.id),
            })
            .await
            .unwrap();
        assert_eq!(involving_alice.pagination.total, 2);
        assert!(storage.is_file_approver_impl(file.id, bob.id).await.unwrap());
    }
}
