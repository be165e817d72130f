use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::{
    ApiResponse, ErrorCode,
    approvals::{
        entities::ApprovalAction,
        requests::{ApprovalListParams, CreateApprovalRequest, DecideApprovalRequest},
    },
};
use crate::services::ApprovalService;
use crate::utils::SafeIDI64;

static APPROVAL_SERVICE: Lazy<ApprovalService> = Lazy::new(ApprovalService::new_lazy);

pub async fn list_approvals(
    req: HttpRequest,
    query: web::Query<ApprovalListParams>,
) -> ActixResult<HttpResponse> {
    APPROVAL_SERVICE
        .list_approvals(query.into_inner(), &req)
        .await
}

pub async fn create_approval(
    req: HttpRequest,
    body: web::Json<CreateApprovalRequest>,
) -> ActixResult<HttpResponse> {
    APPROVAL_SERVICE
        .create_approval(body.into_inner(), &req)
        .await
}

pub async fn get_approval(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    APPROVAL_SERVICE.get_approval(id.0, &req).await
}

/// `action` 为 approve、reject 或 withdraw
pub async fn decide_approval(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<DecideApprovalRequest>,
) -> ActixResult<HttpResponse> {
    let action = match req.match_info().query("action").parse::<ApprovalAction>() {
        Ok(action) => action,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    };
    APPROVAL_SERVICE
        .decide_approval(id.0, action, body.into_inner(), &req)
        .await
}

pub fn configure_approval_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/approvals")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_approvals))
            .route("", web::post().to(create_approval))
            .route("/{id}", web::get().to(get_approval))
            .route("/{id}/{action}", web::post().to(decide_approval)),
    );
}
