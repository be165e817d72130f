use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{FolderService, ensure_unique_sibling};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    common::labels::normalize_labels,
    folders::{requests::CreateFolderRequest, responses::FolderResponse},
};
use crate::services::{access, storage_error_response};
use crate::utils::validate::{normalize_note, validate_name};

pub async fn create_folder(
    service: &FolderService,
    req: CreateFolderRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::workspace_for_write(&storage, &user, req.workspace_id).await {
        return Ok(resp);
    }

    let name = match validate_name(&req.name) {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::FolderNameInvalid, msg)));
        }
    };
    let description = match normalize_note(req.description) {
        Ok(d) => d,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };
    let labels = match normalize_labels(&req.labels) {
        Ok(labels) => labels,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::LabelInvalid, msg)));
        }
    };

    if let Some(parent_id) = req.parent_id
        && let Err(resp) = access::folder_in_workspace(&storage, parent_id, req.workspace_id).await
    {
        return Ok(resp);
    }

    if let Err(resp) =
        ensure_unique_sibling(&storage, req.workspace_id, req.parent_id, &name, None).await
    {
        return Ok(resp);
    }

    let create = CreateFolderRequest {
        workspace_id: req.workspace_id,
        parent_id: req.parent_id,
        name,
        description,
        labels,
    };

    match storage.create_folder(user.id, create).await {
        Ok(folder) => {
            info!("User {} created folder {}", user.id, folder.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                FolderResponse { folder },
                "Folder created",
            )))
        }
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
