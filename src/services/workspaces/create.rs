use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::WorkspaceService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    workspaces::{requests::CreateWorkspaceRequest, responses::WorkspaceResponse},
};
use crate::services::storage_error_response;
use crate::utils::validate::{normalize_note, validate_name};

pub async fn create_workspace(
    service: &WorkspaceService,
    req: CreateWorkspaceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(RequireJWT::unauthorized());
    };

    let name = match validate_name(&req.name) {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::WorkspaceNameInvalid, msg)));
        }
    };
    let description = match normalize_note(req.description) {
        Ok(d) => d,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };

    let storage = service.get_storage(request);
    match storage
        .create_workspace(user_id, CreateWorkspaceRequest { name, description })
        .await
    {
        Ok(workspace) => {
            info!("User {} created workspace {}", user_id, workspace.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                WorkspaceResponse { workspace },
                "Workspace created",
            )))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::WorkspaceAlreadyExists,
            "You already have a workspace with this name",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
