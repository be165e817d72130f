use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::WorkspaceService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, workspaces::responses::WorkspaceResponse};
use crate::services::access;

pub async fn get_workspace(
    service: &WorkspaceService,
    workspace_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    match access::workspace_for_write(&storage, &user, workspace_id).await {
        Ok(workspace) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            WorkspaceResponse { workspace },
            "Workspace retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}
