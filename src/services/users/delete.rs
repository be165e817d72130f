use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::{
    middlewares::RequireJWT,
    models::{ApiResponse, ErrorCode},
    services::{files::blobs::remove_blobs, storage_error_response},
};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(current_id) = RequireJWT::extract_user_id(request) else {
        return Ok(RequireJWT::unauthorized());
    };

    if current_id == user_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    match storage.delete_user(user_id).await {
        Ok(Some(removed)) => {
            info!(
                "Admin {} deleted user {} and {} stored file(s)",
                current_id,
                user_id,
                removed.stored_names.len()
            );
            remove_blobs(&removed.stored_names).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserDeleteFailed)),
    }
}
