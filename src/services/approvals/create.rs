use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ApprovalService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    approvals::{
        requests::{CreateApprovalRequest, NewApproval},
        responses::ApprovalResponse,
    },
};
use crate::services::{access, outbox::wake_outbox, storage_error_response};
use crate::utils::validate::normalize_note;

fn invalid_approver(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::ApprovalApproverInvalid,
        message,
    ))
}

pub async fn create_approval(
    service: &ApprovalService,
    req: CreateApprovalRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    let note = match normalize_note(req.note) {
        Ok(note) => note,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    if let Err(resp) = access::file_for_write(&storage, &user, req.file_id).await {
        return Ok(resp);
    }

    if req.approver_id == user.id {
        return Ok(invalid_approver("You cannot approve your own request"));
    }
    match storage.get_user_by_id(req.approver_id).await {
        Ok(Some(approver)) if approver.is_active => {}
        Ok(Some(_)) => return Ok(invalid_approver("Approver is not active")),
        Ok(None) => return Ok(invalid_approver("Approver does not exist")),
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }

    let new_approval = NewApproval {
        file_id: req.file_id,
        approver_id: req.approver_id,
        assigner_id: user.id,
        request_note: note,
    };

    match storage.create_approval(new_approval).await {
        Ok(approval) => {
            wake_outbox(request);
            info!(
                "User {} requested approval {} on file {} from user {}",
                user.id, approval.id, approval.file_id, approval.approver_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                ApprovalResponse { approval },
                "Approval requested",
            )))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::ApprovalAlreadyPending,
            "This file already has a pending approval",
        ))),
        Err(e) if e.is_not_found() => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "File not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
