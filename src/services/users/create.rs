use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::storage_error_response;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

/// 校验新用户的用户名、邮箱、密码；通过后把密码替换为哈希
pub(crate) fn prepare_new_user(
    mut user_data: CreateUserRequest,
) -> Result<CreateUserRequest, HttpResponse> {
    user_data.username = user_data.username.trim().to_string();
    user_data.email = user_data.email.trim().to_string();

    if let Err(msg) = validate_username(&user_data.username) {
        return Err(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    if let Err(msg) = validate_email(&user_data.email) {
        return Err(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    if let Err(msg) = validate_password(&user_data.password) {
        return Err(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    user_data.password = hash_password(&user_data.password).map_err(|e| {
        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Password hashing failed: {e}"),
        ))
    })?;

    Ok(user_data)
}

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user_data = match prepare_new_user(user_data) {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("User {} created by administrator", user.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "User created")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Username or email already exists",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
