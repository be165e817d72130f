use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FolderService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, folders::responses::FolderResponse};
use crate::services::access;

pub async fn get_folder(
    service: &FolderService,
    folder_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    match access::folder_for_write(&storage, &user, folder_id).await {
        Ok((folder, _)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FolderResponse { folder },
            "Folder retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}
