use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ErrorCode;

/// 统一的 API 响应信封
///
/// 成功时 `code` 为 0；失败时为 [`ErrorCode`] 的数值，`data` 可携带
/// 冲突时的最新资源状态等附加信息。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    fn build(code: ErrorCode, data: Option<T>, message: String) -> Self {
        Self {
            code: code as i32,
            message,
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, Some(data), message.into())
    }

    /// 带数据的错误响应
    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self::build(code, Some(data), message.into())
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success as i32
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, None, message.into())
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(code, None, message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_omits_data() {
        let resp = ApiResponse::error_empty(ErrorCode::ApprovalVersionConflict, "stale");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 5002);
        assert!(json.get("data").is_none());
        assert!(!resp.is_success());
    }

    #[test]
    fn test_success_envelope() {
        let resp = ApiResponse::success(42i64, "ok");
        assert!(resp.is_success());
        assert_eq!(resp.data, Some(42));
    }
}
