use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::FolderService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, folders::requests::DeleteFolderParams};
use crate::services::{access, files::blobs::remove_blobs, storage_error_response};

pub async fn delete_folder(
    service: &FolderService,
    folder_id: i64,
    params: DeleteFolderParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::folder_for_write(&storage, &user, folder_id).await {
        return Ok(resp);
    }

    if !params.recursive.unwrap_or(false) {
        match storage.folder_has_children(folder_id).await {
            Ok(false) => {}
            Ok(true) => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::FolderNotEmpty,
                    "Folder is not empty, pass recursive=true to delete its contents",
                )));
            }
            Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    match storage.delete_folder(folder_id).await {
        Ok(Some(removed)) => {
            info!(
                "User {} deleted folder {} ({} files)",
                user.id,
                folder_id,
                removed.stored_names.len()
            );
            remove_blobs(&removed.stored_names).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Folder deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FolderNotFound,
            "Folder not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
