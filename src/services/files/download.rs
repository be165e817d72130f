use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult,
    http::header::{self, ContentDisposition},
};
use tracing::error;

use super::FileService;
use super::blobs::blob_path;
use crate::errors::FileDeskError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access;

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    file_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    let file = match access::file_for_read(&storage, &user, file_id).await {
        Ok(file) => file,
        Err(resp) => return Ok(resp),
    };

    let buf = match tokio::fs::read(blob_path(&file.stored_name)).await {
        Ok(buf) => buf,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("Blob of file {} is missing: {}", file.id, file.stored_name);
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileBlobMissing,
                "File content is missing",
            )));
        }
        Err(e) => {
            error!("{}", FileDeskError::file_operation(format!("{e}")));
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "File read failed",
                )),
            );
        }
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, file.content_type.as_str()))
        .insert_header(ContentDisposition::attachment(file.name.clone()))
        .body(buf))
}
