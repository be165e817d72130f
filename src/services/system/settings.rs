use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SystemService;
use crate::models::{ApiResponse, system::SystemSettingsResponse};

pub async fn get_settings(
    service: &SystemService,
    _req: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let response = SystemSettingsResponse {
        system_name: config.app.system_name.clone(),
        max_file_size: config.upload.max_size as u64,
        allowed_extensions: config.upload.allowed_extensions.clone(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Settings retrieved successfully",
    )))
}
