use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FolderService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    folders::requests::{FolderListParams, FolderListQuery},
};
use crate::services::{access, files::list::parent_filter, storage_error_response};

pub async fn list_folders(
    service: &FolderService,
    query: FolderListParams,
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
    let list_query = FolderListQuery {
        page,
        size,
        workspace_id: query.workspace_id,
        parent: parent_filter(query.parent_id, query.root_only),
        search: query.search,
    };

    match storage.list_folders_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Folder list retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(&e, ErrorCode::InternalServerError)),
    }
}
