pub mod settings;
pub mod status;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::Storage;

pub struct SystemService {
    storage: Option<Arc<dyn Storage>>,
}

impl SystemService {
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

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 公开的上传限制
    pub async fn get_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::get_settings(self, request).await
    }

    // 运行状态（管理员）
    pub async fn get_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        status::get_status(self, request).await
    }
}
