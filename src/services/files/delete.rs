use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::FileService;
use super::blobs::remove_blobs;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, storage_error_response};

pub async fn delete_file(
    service: &FileService,
    file_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::file_for_write(&storage, &user, file_id).await {
        return Ok(resp);
    }

    match storage.delete_file(file_id).await {
        Ok(Some(file)) => {
            remove_blobs(&[file.stored_name]).await;
            info!("User {} deleted file {}", user.id, file_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("File deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "File not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
