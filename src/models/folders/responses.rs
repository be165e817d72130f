use serde::Serialize;
use ts_rs::TS;

use super::entities::Folder;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "folder.ts")]
pub struct FolderResponse {
    pub folder: Folder,
}
