use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FileService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    files::requests::{FileListParams, FileListQuery},
    folders::requests::ParentFilter,
};
use crate::services::{access, storage_error_response};

/// 由 folder_id / root_only 得到父目录过滤条件，folder_id 优先
pub(crate) fn parent_filter(folder_id: Option<i64>, root_only: Option<bool>) -> ParentFilter {
    match (folder_id, root_only) {
        (Some(id), _) => ParentFilter::Folder(id),
        (None, Some(true)) => ParentFilter::Root,
        _ => ParentFilter::Any,
    }
}

pub async fn list_files(
    service: &FileService,
    query: FileListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };
    let storage = service.get_storage(request);

    if let Err(resp) = access::workspace_for_write(&storage, &user, query.workspace_id).await {
        return Ok(resp);
    }

    let (page, size) = query.pagination.normalized();
    let list_query = FileListQuery {
        page,
        size,
        workspace_id: query.workspace_id,
        folder: parent_filter(query.folder_id, query.root_only),
        search: query.search.filter(|s| !s.trim().is_empty()),
        label: query.label.filter(|s| !s.trim().is_empty()),
    };

    match storage.list_files_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "File list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_filter_precedence() {
        assert_eq!(parent_filter(Some(3), Some(true)), ParentFilter::Folder(3));
        assert_eq!(parent_filter(None, Some(true)), ParentFilter::Root);
        assert_eq!(parent_filter(None, Some(false)), ParentFilter::Any);
        assert_eq!(parent_filter(None, None), ParentFilter::Any);
    }
}
