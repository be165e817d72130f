use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::auth::responses::RefreshTokenResponse;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::jwt::JwtUtils;

use super::AuthService;

fn login_again() -> HttpResponse {
    // 清除无效的 refresh token cookie
    HttpResponse::Unauthorized()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Login expired or invalid, please login again",
        ))
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let claims = match JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!("Refresh token rejected: {}", e);
            return Ok(login_again());
        }
    };
    let Some(user_id) = claims.user_id() else {
        return Ok(login_again());
    };

    // 用户可能在 refresh token 有效期内被停用或删除
    let storage = service.get_storage(request);
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => return Ok(login_again()),
        Err(e) => {
            return Ok(crate::services::storage_error_response(
                &e,
                ErrorCode::InternalServerError,
            ));
        }
    };

    match JwtUtils::generate_access_token(user.id, user.is_admin) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RefreshTokenResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
            },
            "Token refreshed successfully",
        ))),
        Err(e) => {
            tracing::error!("Failed to generate access token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Unable to generate token",
                )),
            )
        }
    }
}

pub async fn handle_get_user(request: &HttpRequest) -> ActixResult<HttpResponse> {
    match RequireJWT::extract_user(request) {
        Some(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserResponse { user },
            "User information retrieved successfully",
        ))),
        None => Ok(RequireJWT::unauthorized()),
    }
}
