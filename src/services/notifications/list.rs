use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::models::{
    ApiResponse, ErrorCode,
    notifications::requests::{NotificationListParams, NotificationListQuery},
};
use crate::services::storage_error_response;

pub async fn list_notifications(
    service: &NotificationService,
    request: &HttpRequest,
    user_id: i64,
    query: NotificationListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let (page, size) = query.pagination.normalized();

    let list_query = NotificationListQuery {
        page,
        size,
        user_id,
        unread_only: query.unread_only.unwrap_or(false),
    };

    match storage.list_notifications_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Notification list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
