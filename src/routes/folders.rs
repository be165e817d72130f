use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::folders::requests::{
    CreateFolderRequest, DeleteFolderParams, FolderListParams, UpdateFolderRequest,
};
use crate::services::FolderService;
use crate::utils::SafeIDI64;

static FOLDER_SERVICE: Lazy<FolderService> = Lazy::new(FolderService::new_lazy);

pub async fn list_folders(
    req: HttpRequest,
    query: web::Query<FolderListParams>,
) -> ActixResult<HttpResponse> {
    FOLDER_SERVICE.list_folders(query.into_inner(), &req).await
}

pub async fn create_folder(
    req: HttpRequest,
    body: web::Json<CreateFolderRequest>,
) -> ActixResult<HttpResponse> {
    FOLDER_SERVICE.create_folder(body.into_inner(), &req).await
}

pub async fn get_folder(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FOLDER_SERVICE.get_folder(id.0, &req).await
}

pub async fn update_folder(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateFolderRequest>,
) -> ActixResult<HttpResponse> {
    FOLDER_SERVICE
        .update_folder(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_folder(
    req: HttpRequest,
    id: SafeIDI64,
    params: web::Query<DeleteFolderParams>,
) -> ActixResult<HttpResponse> {
    FOLDER_SERVICE
        .delete_folder(id.0, params.into_inner(), &req)
        .await
}

pub fn configure_folder_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/folders")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_folders))
            .route("", web::post().to(create_folder))
            .route("/{id}", web::get().to(get_folder))
            .route("/{id}", web::put().to(update_folder))
            .route("/{id}", web::delete().to(delete_folder)),
    );
}
