pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    folders::requests::{
        CreateFolderRequest, DeleteFolderParams, FolderListParams, UpdateFolderRequest,
    },
};
use crate::services::storage_error_response;
use crate::storage::Storage;

pub struct FolderService {
    storage: Option<Arc<dyn Storage>>,
}

impl FolderService {
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

    pub async fn list_folders(
        &self,
        query: FolderListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_folders(self, query, request).await
    }

    pub async fn create_folder(
        &self,
        req: CreateFolderRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_folder(self, req, request).await
    }

    pub async fn get_folder(
        &self,
        folder_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_folder(self, folder_id, request).await
    }

    pub async fn update_folder(
        &self,
        folder_id: i64,
        update: UpdateFolderRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_folder(self, folder_id, update, request).await
    }

    pub async fn delete_folder(
        &self,
        folder_id: i64,
        params: DeleteFolderParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_folder(self, folder_id, params, request).await
    }
}

/// 同一父目录下不允许重名；`exclude` 为正在改名/移动的文件夹自身
pub(crate) async fn ensure_unique_sibling(
    storage: &Arc<dyn Storage>,
    workspace_id: i64,
    parent_id: Option<i64>,
    name: &str,
    exclude: Option<i64>,
) -> Result<(), HttpResponse> {
    match storage
        .find_sibling_folder(workspace_id, parent_id, name)
        .await
    {
        Ok(Some(existing)) if Some(existing.id) != exclude => Err(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::FolderAlreadyExists,
                "A folder with this name already exists here",
            ),
        )),
        Ok(_) => Ok(()),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
