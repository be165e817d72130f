use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::WorkspaceService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, files::blobs::remove_blobs, storage_error_response};

pub async fn delete_workspace(
    service: &WorkspaceService,
    workspace_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::workspace_for_write(&storage, &user, workspace_id).await {
        return Ok(resp);
    }

    match storage.delete_workspace(workspace_id).await {
        Ok(Some(removed)) => {
            info!(
                "User {} deleted workspace {} ({} files)",
                user.id,
                workspace_id,
                removed.stored_names.len()
            );
            remove_blobs(&removed.stored_names).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Workspace deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::WorkspaceNotFound,
            "Workspace not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
