use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::services::storage_error_response;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;

fn auth_failed() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. 根据用户名或邮箱获取用户信息
    let user = match storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(auth_failed()),
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        info!("Failed login attempt for user {}", user.id);
        return Ok(auth_failed());
    }

    if !user.is_active {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::UserInactive,
            "User is not active",
        )));
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login of user {}: {}", user.id, e);
    }

    // 4. 生成令牌对
    let token_pair = match user.generate_token_pair(login_request.remember_me) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            );
        }
    };

    info!("User {} logged in successfully", user.username);

    let refresh_cookie =
        JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, login_request.remember_me);
    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: config.jwt.access_token_expiry * 60,
        user,
    };

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}
