use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::{FolderService, ensure_unique_sibling};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    common::labels::normalize_labels,
    folders::{requests::UpdateFolderRequest, responses::FolderResponse},
};
use crate::services::{access, storage_error_response};
use crate::storage::Storage;
use crate::utils::validate::{normalize_note_update, validate_name};

// 祖先链的最大遍历深度，超出视为数据异常
const MAX_DEPTH: usize = 1024;

/// 新父目录是否为 `folder_id` 自身或其后代
async fn is_self_or_descendant(
    storage: &Arc<dyn Storage>,
    folder_id: i64,
    new_parent: i64,
) -> Result<bool, HttpResponse> {
    let mut current = Some(new_parent);
    for _ in 0..MAX_DEPTH {
        let Some(id) = current else {
            return Ok(false);
        };
        if id == folder_id {
            return Ok(true);
        }
        current = match storage.get_folder_by_id(id).await {
            Ok(Some(folder)) => folder.parent_id,
            Ok(None) => None,
            Err(e) => return Err(storage_error_response(&e, ErrorCode::InternalServerError)),
        };
    }
    Ok(true)
}

pub async fn update_folder(
    service: &FolderService,
    folder_id: i64,
    update: UpdateFolderRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    let (folder, _) = match access::folder_for_write(&storage, &user, folder_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    let name = match update.name.as_deref().map(validate_name).transpose() {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::FolderNameInvalid, msg)));
        }
    };
    let description = match normalize_note_update(update.description) {
        Ok(d) => d,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };
    let labels = match update.labels.map(normalize_labels).transpose() {
        Ok(labels) => labels,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::LabelInvalid, msg)));
        }
    };

    if let Some(Some(parent_id)) = update.parent_id {
        if let Err(resp) = access::folder_in_workspace(&storage, parent_id, folder.workspace_id).await
        {
            return Ok(resp);
        }
        match is_self_or_descendant(&storage, folder.id, parent_id).await {
            Ok(false) => {}
            Ok(true) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FolderInvalidParent,
                    "Cannot move a folder into itself or its descendant",
                )));
            }
            Err(resp) => return Ok(resp),
        }
    }

    let target_parent = update.parent_id.unwrap_or(folder.parent_id);
    let target_name = name.as_deref().unwrap_or(&folder.name);
    if (target_parent != folder.parent_id || target_name != folder.name)
        && let Err(resp) = ensure_unique_sibling(
            &storage,
            folder.workspace_id,
            target_parent,
            target_name,
            Some(folder.id),
        )
        .await
    {
        return Ok(resp);
    }

    let folder_update = UpdateFolderRequest {
        name,
        description,
        labels,
        parent_id: update.parent_id,
    };

    match storage.update_folder(folder_id, folder_update).await {
        Ok(Some(folder)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FolderResponse { folder },
            "Folder updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FolderNotFound,
            "Folder not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
