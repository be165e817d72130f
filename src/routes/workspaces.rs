use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::workspaces::requests::{
    CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceListParams,
};
use crate::services::WorkspaceService;
use crate::utils::SafeIDI64;

static WORKSPACE_SERVICE: Lazy<WorkspaceService> = Lazy::new(WorkspaceService::new_lazy);

pub async fn list_workspaces(
    req: HttpRequest,
    query: web::Query<WorkspaceListParams>,
) -> ActixResult<HttpResponse> {
    WORKSPACE_SERVICE
        .list_workspaces(query.into_inner(), &req)
        .await
}

pub async fn create_workspace(
    req: HttpRequest,
    body: web::Json<CreateWorkspaceRequest>,
) -> ActixResult<HttpResponse> {
    WORKSPACE_SERVICE
        .create_workspace(body.into_inner(), &req)
        .await
}

pub async fn get_workspace(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    WORKSPACE_SERVICE.get_workspace(id.0, &req).await
}

pub async fn update_workspace(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateWorkspaceRequest>,
) -> ActixResult<HttpResponse> {
    WORKSPACE_SERVICE
        .update_workspace(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_workspace(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    WORKSPACE_SERVICE.delete_workspace(id.0, &req).await
}

pub fn configure_workspace_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/workspaces")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_workspaces))
            .route("", web::post().to(create_workspace))
            .route("/{id}", web::get().to(get_workspace))
            .route("/{id}", web::put().to(update_workspace))
            .route("/{id}", web::delete().to(delete_workspace)),
    );
}
