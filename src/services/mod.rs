pub(crate) mod access;
pub mod approvals;
pub mod auth;
pub mod files;
pub mod folders;
pub mod notifications;
pub mod onboarding;
pub mod outbox;
pub mod system;
pub mod users;
pub mod workspaces;

pub use approvals::ApprovalService;
pub use auth::AuthService;
pub use files::FileService;
pub use folders::FolderService;
pub use notifications::NotificationService;
pub use onboarding::OnboardingService;
pub use outbox::{OutboxDispatcher, OutboxNotifier};
pub use system::SystemService;
pub use users::UserService;
pub use workspaces::WorkspaceService;

use actix_web::HttpResponse;
use tracing::error;

use crate::errors::FileDeskError;
use crate::models::{ApiResponse, ErrorCode};

/// 把存储层错误映射为响应；非业务错误记录日志并使用 `fallback` 错误码
pub(crate) fn storage_error_response(err: &FileDeskError, fallback: ErrorCode) -> HttpResponse {
    match err {
        FileDeskError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::Conflict, msg))
        }
        FileDeskError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, msg))
        }
        FileDeskError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
        }
        FileDeskError::Authorization(msg) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, msg))
        }
        other => {
            error!("{}", other);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(fallback, other.message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_status_mapping() {
        let cases = [
            (FileDeskError::conflict("dup"), 409),
            (FileDeskError::not_found("gone"), 404),
            (FileDeskError::validation("bad"), 400),
            (FileDeskError::authorization("no"), 403),
            (FileDeskError::database_operation("boom"), 500),
        ];
        for (err, status) in cases {
            let resp = storage_error_response(&err, ErrorCode::InternalServerError);
            assert_eq!(resp.status().as_u16(), status, "{err}");
        }
    }
}
