use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ApprovalService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    approvals::{
        entities::{Approval, ApprovalAction, DecisionOutcome},
        requests::{ApprovalDecision, DecideApprovalRequest},
        responses::ApprovalResponse,
        state::{TransitionError, next_status},
    },
};
use crate::services::{outbox::wake_outbox, storage_error_response};
use crate::utils::validate::normalize_note;

/// 409，并附带当前最新的审批记录
fn version_conflict(current: Approval) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error(
        ErrorCode::ApprovalVersionConflict,
        ApprovalResponse { approval: current },
        "Approval was modified by someone else, reload and retry",
    ))
}

pub async fn decide_approval(
    service: &ApprovalService,
    approval_id: i64,
    action: ApprovalAction,
    req: DecideApprovalRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    let remarks = match normalize_note(req.remarks) {
        Ok(remarks) => remarks,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    let approval = match storage.get_approval_by_id(approval_id).await {
        Ok(Some(approval)) => approval,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ApprovalNotFound,
                "Approval not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    let participant = user_id == approval.approver_id || user_id == approval.assigner_id;
    let target = match next_status(&approval, action, user_id) {
        Ok(target) => target,
        // 参与者基于旧版本操作时，返回最新记录而不是单纯的非法流转
        Err(TransitionError::NotAllowed { .. })
            if participant && approval.version != req.version =>
        {
            return Ok(version_conflict(approval));
        }
        Err(e @ TransitionError::NotAllowed { .. }) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ApprovalInvalidTransition,
                e.to_string(),
            )));
        }
        Err(e @ TransitionError::Forbidden { .. }) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::ApprovalPermissionDenied,
                e.to_string(),
            )));
        }
    };

    // 客户端看到的已经是旧版本
    if approval.version != req.version {
        return Ok(version_conflict(approval));
    }

    let decision = ApprovalDecision {
        approval_id,
        expected_version: req.version,
        target,
        remarks,
    };

    match storage.decide_approval(decision).await {
        Ok(DecisionOutcome::Applied(approval)) => {
            wake_outbox(request);
            info!(
                "User {} moved approval {} to {} (version {})",
                user_id, approval.id, approval.status, approval.version
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ApprovalResponse { approval },
                format!("Approval {}", approval_status_word(action)),
            )))
        }
        Ok(DecisionOutcome::Stale(current)) => Ok(version_conflict(current)),
        Err(e) if e.is_not_found() => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ApprovalNotFound,
            "Approval not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

fn approval_status_word(action: ApprovalAction) -> &'static str {
    match action {
        ApprovalAction::Approve => "approved",
        ApprovalAction::Reject => "rejected",
        ApprovalAction::Withdraw => "withdrawn",
    }
}
