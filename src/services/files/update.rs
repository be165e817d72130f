use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FileService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    common::labels::normalize_labels,
    files::{
        requests::{FileUpdate, UpdateFileRequest},
        responses::FileResponse,
    },
};
use crate::services::{access, storage_error_response};
use crate::utils::validate::{normalize_note_update, validate_name};

pub async fn update_file(
    service: &FileService,
    file_id: i64,
    update: UpdateFileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    let (file, _) = match access::file_for_write(&storage, &user, file_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    let name = match update.name.as_deref().map(validate_name).transpose() {
        Ok(name) => name,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::FileNameInvalid, msg)));
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

    // 只能在同一工作区内移动
    if let Some(Some(folder_id)) = update.folder_id
        && let Err(resp) = access::folder_in_workspace(&storage, folder_id, file.workspace_id).await
    {
        return Ok(resp);
    }

    let file_update = FileUpdate {
        name,
        description,
        labels,
        folder_id: update.folder_id,
    };

    match storage.update_file(file_id, file_update).await {
        Ok(Some(file)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FileResponse { file },
            "File updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "File not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
