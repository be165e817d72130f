use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct SystemStatusResponse {
    pub system_name: String,
    pub version: String,
    pub environment: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: i64,
    pub outbox_pending: i64,
    pub outbox_failed: i64,
}

/// 客户端上传前需要知道的限制
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct SystemSettingsResponse {
    pub system_name: String,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}
