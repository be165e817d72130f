use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ApprovalService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    approvals::responses::ApprovalDetail,
    users::entities::UserSummary,
};
use crate::services::storage_error_response;

pub async fn get_approval(
    service: &ApprovalService,
    approval_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

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

    let file = match storage.get_file_by_id(approval.file_id).await {
        Ok(file) => file,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    let participant = user.id == approval.approver_id || user.id == approval.assigner_id;
    if !participant && !user.is_admin {
        let owner = match &file {
            Some(file) => match storage.get_workspace_by_id(file.workspace_id).await {
                Ok(ws) => ws.map(|ws| ws.owner_id),
                Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
            },
            None => None,
        };
        if owner != Some(user.id) {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::ApprovalPermissionDenied,
                "You do not have access to this approval",
            )));
        }
    }

    let users = match storage
        .get_users_by_ids(&[approval.approver_id, approval.assigner_id])
        .await
    {
        Ok(users) => users,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };
    let summary = |id: i64| users.iter().find(|u| u.id == id).map(UserSummary::from);

    let detail = ApprovalDetail {
        approver: summary(approval.approver_id),
        assigner: summary(approval.assigner_id),
        file_name: file.map(|f| f.name),
        approval,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        detail,
        "Approval retrieved successfully",
    )))
}
