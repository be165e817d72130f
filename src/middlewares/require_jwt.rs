/*!
 * JWT 认证中间件
 *
 * 从 `Authorization: Bearer <token>` 中取出 access token 并校验，
 * 成功后把当前用户放入请求扩展：
 *
 * ```rust,ignore
 * web::scope("/api/v1/files")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_files))
 *
 * async fn list_files(req: HttpRequest) -> ActixResult<HttpResponse> {
 *     let user = RequireJWT::extract_user(&req);
 *     // ...
 * }
 * ```
 *
 * 用户信息按 token 缓存 `cache.default_ttl` 秒，注销时清除。
 * 被停用的用户即使持有未过期的 token 也会被拒绝。
 */

use crate::cache::ObjectCache;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireJWT;

/// 缓存键：按 access token 区分
pub fn user_cache_key(token: &str) -> String {
    format!("user:{token}")
}

/// 从 Authorization 头取出 bearer token
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn authenticate(req: &ServiceRequest) -> Result<User, (ErrorCode, String)> {
    let unauthorized = |msg: &str| (ErrorCode::Unauthorized, msg.to_string());

    let token = bearer_token(req.request())
        .ok_or_else(|| unauthorized("Missing or invalid Authorization header"))?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        unauthorized("Invalid or expired token")
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|c| c.get_ref().clone());

    if let Some(cache) = &cache
        && let Some(user) = cache.get_json::<User>(&user_cache_key(token)).await
    {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| {
            (
                ErrorCode::InternalServerError,
                "Storage not configured".to_string(),
            )
        })?
        .get_ref()
        .clone();

    let user_id = claims
        .user_id()
        .ok_or_else(|| unauthorized("Invalid subject in token"))?;

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            info!("Failed to load user {} for authentication: {}", user_id, e);
            (
                ErrorCode::InternalServerError,
                "Failed to load user".to_string(),
            )
        })?
        .ok_or_else(|| unauthorized("User not found"))?;

    if !user.is_active {
        return Err((ErrorCode::UserInactive, "User is not active".to_string()));
    }

    if let Some(cache) = &cache {
        cache.insert_json(user_cache_key(token), &user, 0).await;
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // CORS 预检不带凭据
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(
                    req.into_response(HttpResponse::NoContent().finish().map_into_right_body())
                );
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err((code, message)) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        message
                    );
                    let status = if code == ErrorCode::InternalServerError {
                        StatusCode::INTERNAL_SERVER_ERROR
                    } else {
                        StatusCode::UNAUTHORIZED
                    };
                    Ok(req.into_response(
                        create_error_response(status, code, &message).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前用户，仅在 RequireJWT 包裹的路由中可用
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    /// 未认证时的标准响应
    pub fn unauthorized() -> HttpResponse {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))
    }
}
