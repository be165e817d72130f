use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ApprovalService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    approvals::requests::{ApprovalListParams, ApprovalListQuery},
};
use crate::services::storage_error_response;

pub async fn list_approvals(
    service: &ApprovalService,
    query: ApprovalListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);
    let (page, size) = query.pagination.normalized();

    let list_query = ApprovalListQuery {
        page,
        size,
        user_id,
        role: query.role,
        status: query.status,
        file_id: query.file_id,
    };

    match storage.list_approvals_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Approval list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
