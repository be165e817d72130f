use serde::Serialize;
use ts_rs::TS;

use super::entities::Workspace;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "workspace.ts")]
pub struct WorkspaceResponse {
    pub workspace: Workspace,
}
