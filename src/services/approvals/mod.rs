pub mod create;
pub mod decide;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::approvals::{
    entities::ApprovalAction,
    requests::{ApprovalListParams, CreateApprovalRequest, DecideApprovalRequest},
};
use crate::storage::Storage;

pub struct ApprovalService {
    storage: Option<Arc<dyn Storage>>,
}

impl ApprovalService {
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

    // 发起审批
    pub async fn create_approval(
        &self,
        req: CreateApprovalRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_approval(self, req, request).await
    }

    // 通过 / 驳回 / 撤回
    pub async fn decide_approval(
        &self,
        approval_id: i64,
        action: ApprovalAction,
        req: DecideApprovalRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        decide::decide_approval(self, approval_id, action, req, request).await
    }

    pub async fn list_approvals(
        &self,
        query: ApprovalListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_approvals(self, query, request).await
    }

    pub async fn get_approval(
        &self,
        approval_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_approval(self, approval_id, request).await
    }
}
