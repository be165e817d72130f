use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::files::requests::{FileListParams, UpdateFileRequest};
use crate::services::FileService;
use crate::utils::SafeIDI64;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_upload(&request, payload).await
}

pub async fn handle_download(request: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_download(&request, id.0).await
}

pub async fn list_files(
    request: HttpRequest,
    query: web::Query<FileListParams>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.list_files(query.into_inner(), &request).await
}

pub async fn get_file(request: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.get_file(id.0, &request).await
}

pub async fn update_file(
    request: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateFileRequest>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .update_file(id.0, body.into_inner(), &request)
        .await
}

pub async fn delete_file(request: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.delete_file(id.0, &request).await
}

// 配置路由
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/files")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_files))
            .route("/upload", web::post().to(handle_upload))
            .route("/{id}", web::get().to(get_file))
            .route("/{id}", web::put().to(update_file))
            .route("/{id}", web::delete().to(delete_file))
            .route("/{id}/download", web::get().to(handle_download)),
    );
}
