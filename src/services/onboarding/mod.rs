use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{ApiResponse, ErrorCode, onboarding::UpdateOnboardingRequest};
use crate::services::storage_error_response;
use crate::storage::Storage;

pub struct OnboardingService {
    storage: Option<Arc<dyn Storage>>,
}

impl OnboardingService {
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

    pub async fn get_status(&self, request: &HttpRequest, user_id: i64) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        match storage.get_onboarding_status(user_id).await {
            Ok(status) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                status,
                "Onboarding status retrieved successfully",
            ))),
            Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    pub async fn update_status(
        &self,
        request: &HttpRequest,
        user_id: i64,
        req: UpdateOnboardingRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        match storage.upsert_onboarding_status(user_id, req.completed).await {
            Ok(status) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                status,
                "Onboarding status updated",
            ))),
            Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
        }
    }
}
