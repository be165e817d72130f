use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::require_jwt::{bearer_token, user_cache_key};
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

/// 处理用户登出
///
/// 清除 refresh_token cookie，并移除当前 access token 对应的用户缓存。
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(token) = bearer_token(request)
        && let Some(cache) = request.app_data::<web::Data<Arc<dyn ObjectCache>>>()
    {
        cache.remove(&user_cache_key(token)).await;
    }

    // max_age=0 会让浏览器删除该 cookie
    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::success_empty("Logged out")))
}
