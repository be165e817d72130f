//! JSON / 查询参数解析错误处理

use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Invalid JSON body for {}: {}", req.path(), err);

    let response = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Request body is too large",
            ))
        }
        JsonPayloadError::ContentType => HttpResponse::UnsupportedMediaType().json(
            ApiResponse::error_empty(ErrorCode::BadRequest, "Content-Type must be application/json"),
        ),
        _ => HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Invalid JSON body: {err}"),
        )),
    };

    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Invalid query string for {}: {}", req.path(), err);

    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid query parameters: {err}"),
    ));

    InternalError::from_response(err, response).into()
}
