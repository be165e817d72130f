use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::WorkspaceService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    workspaces::{requests::UpdateWorkspaceRequest, responses::WorkspaceResponse},
};
use crate::services::{access, storage_error_response};
use crate::utils::validate::{normalize_note_update, validate_name};

pub async fn update_workspace(
    service: &WorkspaceService,
    workspace_id: i64,
    update: UpdateWorkspaceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::workspace_for_write(&storage, &user, workspace_id).await {
        return Ok(resp);
    }

    let name = match update.name.as_deref().map(validate_name).transpose() {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::WorkspaceNameInvalid, msg)));
        }
    };
    let description = match normalize_note_update(update.description) {
        Ok(d) => d,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    match storage
        .update_workspace(workspace_id, UpdateWorkspaceRequest { name, description })
        .await
    {
        Ok(Some(workspace)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            WorkspaceResponse { workspace },
            "Workspace updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::WorkspaceNotFound,
            "Workspace not found",
        ))),
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::WorkspaceAlreadyExists,
            "You already have a workspace with this name",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
