pub mod rate_limit;
pub mod require_admin;
pub mod require_jwt;

pub use rate_limit::RateLimit;
pub use require_admin::RequireAdmin;
pub use require_jwt::RequireJWT;

use actix_web::{HttpResponse, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// 中间件短路时返回的统一错误信封
pub(crate) fn create_error_response(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::error_empty(code, message))
}
