use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::models::{AppStartTime, ApiResponse, ErrorCode, system::SystemStatusResponse};
use crate::services::storage_error_response;

pub async fn get_status(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let storage = service.get_storage(request);

    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|t| t.start_datetime)
        .unwrap_or_else(chrono::Utc::now);
    let uptime_seconds = chrono::Utc::now()
        .signed_duration_since(started_at)
        .num_seconds()
        .max(0);

    let backlog = match storage.outbox_backlog().await {
        Ok(backlog) => backlog,
        Err(e) => return Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    let response = SystemStatusResponse {
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.app.environment.clone(),
        started_at,
        uptime_seconds,
        outbox_pending: backlog.pending as i64,
        outbox_failed: backlog.failed as i64,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "System status retrieved successfully",
    )))
}
