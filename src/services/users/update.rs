use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::UpdateUserRequest, responses::UserResponse},
};
use crate::services::storage_error_response;
use crate::utils::validate::{validate_email, validate_password};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 管理员不能取消自己的管理员身份或停用自己
    if RequireJWT::extract_user_id(request) == Some(user_id)
        && (update_data.is_admin == Some(false) || update_data.is_active == Some(false))
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            "Cannot revoke your own administrator access",
        )));
    }

    if let Some(email) = update_data.email.as_mut() {
        *email = email.trim().to_string();
        if let Err(msg) = validate_email(email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
    }

    if let Some(password) = update_data.password.take() {
        if let Err(msg) = validate_password(&password) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
        }
        match crate::utils::password::hash_password(&password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Password hashing failed: {e}"),
                    )),
                );
            }
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserResponse { user },
            "User information updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Email already in use",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::UserUpdateFailed)),
    }
}
