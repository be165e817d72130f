//! 资源访问检查
//!
//! 工作区所有者和管理员拥有读写权限；文件的（历任）审批人对该文件只读。
//! 检查失败时返回可直接响应给客户端的 `HttpResponse`。

use actix_web::HttpResponse;
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode, files::entities::FileEntry, folders::entities::Folder,
    users::entities::User, workspaces::entities::Workspace,
};
use crate::services::storage_error_response;
use crate::storage::Storage;

pub(crate) type AccessResult<T> = std::result::Result<T, HttpResponse>;

fn not_found(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

fn denied(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn can_manage(user: &User, workspace: &Workspace) -> bool {
    user.is_admin || workspace.owner_id == user.id
}

/// 需要对工作区的写权限
pub(crate) async fn workspace_for_write(
    storage: &Arc<dyn Storage>,
    user: &User,
    workspace_id: i64,
) -> AccessResult<Workspace> {
    let workspace = match storage.get_workspace_by_id(workspace_id).await {
        Ok(Some(ws)) => ws,
        Ok(None) => return Err(not_found(ErrorCode::WorkspaceNotFound, "Workspace not found")),
        Err(e) => return Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    };

    if !can_manage(user, &workspace) {
        return Err(denied(
            ErrorCode::WorkspacePermissionDenied,
            "You do not have access to this workspace",
        ));
    }
    Ok(workspace)
}

/// 文件夹及其所在工作区，需要写权限
pub(crate) async fn folder_for_write(
    storage: &Arc<dyn Storage>,
    user: &User,
    folder_id: i64,
) -> AccessResult<(Folder, Workspace)> {
    let folder = match storage.get_folder_by_id(folder_id).await {
        Ok(Some(folder)) => folder,
        Ok(None) => return Err(not_found(ErrorCode::FolderNotFound, "Folder not found")),
        Err(e) => return Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    };
    let workspace = workspace_for_write(storage, user, folder.workspace_id).await?;
    Ok((folder, workspace))
}

async fn load_file(storage: &Arc<dyn Storage>, file_id: i64) -> AccessResult<FileEntry> {
    match storage.get_file_by_id(file_id).await {
        Ok(Some(file)) => Ok(file),
        Ok(None) => Err(not_found(ErrorCode::FileNotFound, "File not found")),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub(crate) async fn file_for_write(
    storage: &Arc<dyn Storage>,
    user: &User,
    file_id: i64,
) -> AccessResult<(FileEntry, Workspace)> {
    let file = load_file(storage, file_id).await?;
    let workspace = workspace_for_write(storage, user, file.workspace_id).await?;
    Ok((file, workspace))
}

/// 读权限：可写者或该文件的审批人
pub(crate) async fn file_for_read(
    storage: &Arc<dyn Storage>,
    user: &User,
    file_id: i64,
) -> AccessResult<FileEntry> {
    let file = load_file(storage, file_id).await?;
    if user.is_admin {
        return Ok(file);
    }

    match storage.get_workspace_by_id(file.workspace_id).await {
        Ok(Some(ws)) if ws.owner_id == user.id => return Ok(file),
        Ok(_) => {}
        Err(e) => return Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }

    match storage.is_file_approver(file.id, user.id).await {
        Ok(true) => Ok(file),
        Ok(false) => Err(denied(
            ErrorCode::WorkspacePermissionDenied,
            "You do not have access to this file",
        )),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

/// 目标文件夹必须存在且属于同一工作区
pub(crate) async fn folder_in_workspace(
    storage: &Arc<dyn Storage>,
    folder_id: i64,
    workspace_id: i64,
) -> AccessResult<Folder> {
    match storage.get_folder_by_id(folder_id).await {
        Ok(Some(folder)) if folder.workspace_id == workspace_id => Ok(folder),
        Ok(Some(_)) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FolderInvalidParent,
            "Folder belongs to another workspace",
        ))),
        Ok(None) => Err(not_found(ErrorCode::FolderNotFound, "Folder not found")),
        Err(e) => Err(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
