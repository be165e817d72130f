use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::RegisterRequest, responses::UserResponse},
};
use crate::services::{storage_error_response, users::create::prepare_new_user};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 注册用户一律不是管理员
    let create_request = match prepare_new_user(register_request.into()) {
        Ok(req) => req,
        Err(resp) => return Ok(resp),
    };

    let storage = service.get_storage(request);

    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("User {} registered", user.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "Registration successful")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Username or email already exists",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::RegisterFailed)),
    }
}
