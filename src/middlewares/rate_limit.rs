/*!
 * 速率限制中间件
 *
 * 固定窗口计数：每个键在窗口开始后的 `window_secs` 秒内最多放行
 * `max_requests` 次，超过后返回 429 并带 `Retry-After`。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 *
 * 键为 `前缀:ip:<客户端 IP>`。部署在反向代理之后时，代理需要设置
 * `Forwarded` 或 `X-Forwarded-For`，否则所有请求会共享代理的地址。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::{future::Cache, ops::compute::Op};
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode};

/// 窗口起点与窗口内已放行次数
type Window = (Instant, u32);

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    key_prefix: &'static str,
    // 克隆之间共享计数
    counters: Cache<String, Window>,
}

impl RateLimit {
    pub fn new(key_prefix: &'static str, max_requests: u32, window_secs: u64) -> Self {
        let window = Duration::from_secs(window_secs.max(1));
        Self {
            max_requests: max_requests.max(1),
            window,
            key_prefix,
            counters: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(window)
                .build(),
        }
    }

    /// 登录与注册，参数来自 `rate_limit` 配置
    pub fn login() -> Self {
        let config = &AppConfig::get().rate_limit;
        Self::new("login", config.login_max_requests, config.login_window_secs)
    }

    /// 计数并返回本次是否放行，以及窗口剩余秒数
    async fn hit(&self, key: String) -> (bool, u64) {
        let now = Instant::now();
        let window = self.window;
        let max = self.max_requests;

        let entry = self
            .counters
            .entry(key)
            .and_compute_with(|current| {
                let next = match current.map(|e| e.into_value()) {
                    Some((start, count)) if now.duration_since(start) < window => {
                        (start, count.saturating_add(1))
                    }
                    _ => (now, 1),
                };
                std::future::ready(Op::Put(next))
            })
            .await;

        let (start, count) = match entry {
            moka::ops::compute::CompResult::Inserted(e)
            | moka::ops::compute::CompResult::ReplacedWith(e) => e.into_value(),
            _ => (now, 1),
        };

        let retry_after = window
            .saturating_sub(now.duration_since(start))
            .as_secs()
            .max(1);
        (count <= max, retry_after)
    }
}

/// 客户端 IP，优先使用代理头中的地址
fn client_ip(req: &ServiceRequest) -> String {
    let info = req.connection_info();
    let Some(raw) = info.realip_remote_addr() else {
        return "unknown".to_string();
    };

    raw.parse::<SocketAddr>()
        .map(|addr| addr.ip())
        .or_else(|_| raw.parse::<IpAddr>())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn rate_limited_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let key = format!("{}:ip:{}", limit.key_prefix, client_ip(&req));
            let (allowed, retry_after) = limit.hit(key.clone()).await;

            if !allowed {
                warn!("Rate limit exceeded for {}", key);
                return Ok(req
                    .into_response(rate_limited_response(retry_after).map_into_right_body()));
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn test_blocks_after_limit_per_ip() {
        let app = test::init_service(
            App::new().service(
                web::resource("/login")
                    .wrap(RateLimit::new("test", 2, 60))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let from = |ip: &str| {
            test::TestRequest::post()
                .uri("/login")
                .peer_addr(format!("{ip}:40000").parse().unwrap())
                .to_request()
        };

        for _ in 0..2 {
            let resp = test::call_service(&app, from("10.0.0.1")).await;
            assert!(resp.status().is_success());
        }

        let blocked = test::call_service(&app, from("10.0.0.1")).await;
        assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(blocked.headers().contains_key("Retry-After"));

        let other = test::call_service(&app, from("10.0.0.2")).await;
        assert!(other.status().is_success());
    }
}
