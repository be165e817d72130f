use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::WorkspaceService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    workspaces::requests::{WorkspaceListParams, WorkspaceListQuery},
};
use crate::services::storage_error_response;

pub async fn list_workspaces(
    service: &WorkspaceService,
    query: WorkspaceListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);
    let (page, size) = query.pagination.normalized();

    // 管理员传 all=true 时查看全部，否则只看自己的
    let owner_id = if user.is_admin && query.all.unwrap_or(false) {
        None
    } else {
        Some(user.id)
    };

    let list_query = WorkspaceListQuery {
        page,
        size,
        owner_id,
        search: query.search,
    };

    match storage.list_workspaces_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Workspace list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
