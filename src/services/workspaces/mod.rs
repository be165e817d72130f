pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::workspaces::requests::{
    CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceListParams,
};
use crate::storage::Storage;

pub struct WorkspaceService {
    storage: Option<Arc<dyn Storage>>,
}

impl WorkspaceService {
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

    pub async fn list_workspaces(
        &self,
        query: WorkspaceListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_workspaces(self, query, request).await
    }

    pub async fn create_workspace(
        &self,
        req: CreateWorkspaceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_workspace(self, req, request).await
    }

    pub async fn get_workspace(
        &self,
        workspace_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_workspace(self, workspace_id, request).await
    }

    pub async fn update_workspace(
        &self,
        workspace_id: i64,
        update: UpdateWorkspaceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_workspace(self, workspace_id, update, request).await
    }

    pub async fn delete_workspace(
        &self,
        workspace_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_workspace(self, workspace_id, request).await
    }
}
