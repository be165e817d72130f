pub mod blobs;
pub mod delete;
pub mod download;
pub mod get;
pub mod list;
pub mod update;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::files::requests::{FileListParams, UpdateFileRequest};
use crate::storage::Storage;

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 上传文件
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, payload).await
    }

    // 下载文件
    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        file_id: i64,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, file_id).await
    }

    pub async fn list_files(
        &self,
        query: FileListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_files(self, query, request).await
    }

    pub async fn get_file(&self, file_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_file(self, file_id, request).await
    }

    pub async fn update_file(
        &self,
        file_id: i64,
        update: UpdateFileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_file(self, file_id, update, request).await
    }

    pub async fn delete_file(
        &self,
        file_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_file(self, file_id, request).await
    }
}
