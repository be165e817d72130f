//! 路径参数提取器
//!
//! 解析失败时直接返回统一的 JSON 错误信封，而不是 actix 默认的纯文本 404。

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path(message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

/// 解析 `{name}` 路径段为正整数 ID
fn positive_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| bad_path(format!("Missing path parameter '{name}'")))?;

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path(format!("Invalid {name}: {raw}"))),
    }
}

/// `{id}` 路径参数
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(positive_id(req, "id").map(SafeIDI64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_rejects_non_positive_ids() {
        let req = TestRequest::default().param("id", "12").to_http_request();
        assert_eq!(positive_id(&req, "id").unwrap(), 12);

        for raw in ["0", "-3", "abc", "1.5"] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(positive_id(&req, "id").is_err(), "{raw} should be rejected");
        }

        let req = TestRequest::default().to_http_request();
        assert!(positive_id(&req, "id").is_err());
    }
}
