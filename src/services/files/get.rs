use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FileService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, files::responses::FileResponse};
use crate::services::access;

pub async fn get_file(
    service: &FileService,
    file_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    match access::file_for_read(&storage, &user, file_id).await {
        Ok(file) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FileResponse { file },
            "File retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}
