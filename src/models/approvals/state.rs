//! 审批状态机
//!
//! ```text
//! pending --approve(approver)--> approved
//! pending --reject(approver)---> rejected
//! pending --withdraw(assigner)-> withdrawn
//! ```
//!
//! 只有 `pending` 存在出边。守卫只看参与者身份，管理员不会绕过。

use std::fmt;

use super::entities::{Approval, ApprovalAction, ApprovalStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// 当前状态不允许该动作
    NotAllowed {
        from: ApprovalStatus,
        action: ApprovalAction,
    },
    /// 执行者不是该动作要求的参与者
    Forbidden {
        action: ApprovalAction,
        actor_id: i64,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::NotAllowed { from, action } => {
                write!(f, "Cannot {action} an approval that is {from}")
            }
            TransitionError::Forbidden { action, actor_id } => {
                write!(f, "User {actor_id} is not allowed to {action} this approval")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

impl ApprovalAction {
    /// 动作成功后的目标状态
    pub fn target(&self) -> ApprovalStatus {
        match self {
            ApprovalAction::Approve => ApprovalStatus::Approved,
            ApprovalAction::Reject => ApprovalStatus::Rejected,
            ApprovalAction::Withdraw => ApprovalStatus::Withdrawn,
        }
    }

    fn permits(&self, approval: &Approval, actor_id: i64) -> bool {
        match self {
            ApprovalAction::Approve | ApprovalAction::Reject => approval.approver_id == actor_id,
            ApprovalAction::Withdraw => approval.assigner_id == actor_id,
        }
    }
}

/// 校验并计算下一状态，不修改任何数据
///
/// 状态检查先于身份检查：对终态记录的任何动作都报告为非法流转。
pub fn next_status(
    approval: &Approval,
    action: ApprovalAction,
    actor_id: i64,
) -> Result<ApprovalStatus, TransitionError> {
    if approval.status.is_terminal() {
        return Err(TransitionError::NotAllowed {
            from: approval.status,
            action,
        });
    }
    if !action.permits(approval, actor_id) {
        return Err(TransitionError::Forbidden { action, actor_id });
    }
    Ok(action.target())
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPROVER: i64 = 10;
    const ASSIGNER: i64 = 20;
    const OUTSIDER: i64 = 30;

    fn approval(status: ApprovalStatus) -> Approval {
        let now = chrono::Utc::now();
        Approval {
            id: 1,
            file_id: 5,
            approver_id: APPROVER,
            assigner_id: ASSIGNER,
            status,
            request_note: None,
            remarks: None,
            version: 1,
            requested_at: now,
            decided_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_pending_transitions() {
        let a = approval(ApprovalStatus::Pending);
        assert_eq!(
            next_status(&a, ApprovalAction::Approve, APPROVER),
            Ok(ApprovalStatus::Approved)
        );
        assert_eq!(
            next_status(&a, ApprovalAction::Reject, APPROVER),
            Ok(ApprovalStatus::Rejected)
        );
        assert_eq!(
            next_status(&a, ApprovalAction::Withdraw, ASSIGNER),
            Ok(ApprovalStatus::Withdrawn)
        );
    }

    #[test]
    fn test_actor_guards() {
        let a = approval(ApprovalStatus::Pending);
        assert!(matches!(
            next_status(&a, ApprovalAction::Approve, ASSIGNER),
            Err(TransitionError::Forbidden { .. })
        ));
        assert!(matches!(
            next_status(&a, ApprovalAction::Withdraw, APPROVER),
            Err(TransitionError::Forbidden { .. })
        ));
        assert!(matches!(
            next_status(&a, ApprovalAction::Reject, OUTSIDER),
            Err(TransitionError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_terminal_states_have_no_transitions() {
        for status in [
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::Withdrawn,
        ] {
            let a = approval(status);
            for (action, actor) in [
                (ApprovalAction::Approve, APPROVER),
                (ApprovalAction::Reject, APPROVER),
                (ApprovalAction::Withdraw, ASSIGNER),
            ] {
                assert_eq!(
                    next_status(&a, action, actor),
                    Err(TransitionError::NotAllowed { from: status, action })
                );
            }
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        assert_eq!("withdrawn".parse::<ApprovalStatus>(), Ok(ApprovalStatus::Withdrawn));
        assert!("cancelled".parse::<ApprovalStatus>().is_err());
        assert_eq!(ApprovalStatus::Approved.to_string(), "approved");
        assert_eq!("reject".parse::<ApprovalAction>(), Ok(ApprovalAction::Reject));
    }
}
