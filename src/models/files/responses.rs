use serde::Serialize;
use ts_rs::TS;

use super::entities::FileEntry;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileResponse {
    pub file: FileEntry,
}
