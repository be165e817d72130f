use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};
use uuid::Uuid;

use super::FileService;
use super::blobs::{blob_path, remove_blobs};
use crate::config::AppConfig;
use crate::errors::FileDeskError;
use crate::middlewares::RequireJWT;
use crate::models::common::labels::parse_labels_field;
use crate::models::files::{entities::NewFile, responses::FileResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, storage_error_response};
use crate::utils::validate::{normalize_note, validate_name};
use crate::utils::validate_magic_bytes;

// 魔术字节检查所需的最少头部字节
const HEAD_LEN: usize = 64;
// 普通表单字段的最大长度
const MAX_TEXT_FIELD: usize = 8 * 1024;

struct ReceivedFile {
    name: String,
    stored_name: String,
    size: i64,
    content_type: String,
}

#[derive(Default)]
struct UploadForm {
    workspace_id: Option<i64>,
    folder_id: Option<i64>,
    description: Option<String>,
    labels: Vec<String>,
    file: Option<ReceivedFile>,
}

fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

fn upload_failed(err: FileDeskError) -> HttpResponse {
    error!("{err}");
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::FileUploadFailed,
        "Failed to store uploaded file",
    ))
}

async fn read_text(field: &mut Field) -> Result<String, HttpResponse> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| bad_request(ErrorCode::BadRequest, e.to_string()))?;
        buf.extend_from_slice(&data);
        if buf.len() > MAX_TEXT_FIELD {
            return Err(bad_request(ErrorCode::BadRequest, "Form field is too large"));
        }
    }
    String::from_utf8(buf).map_err(|_| bad_request(ErrorCode::BadRequest, "Form field is not UTF-8"))
}

fn parse_id(raw: &str, field: &str) -> Result<Option<i64>, HttpResponse> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(bad_request(
            ErrorCode::BadRequest,
            format!("Invalid {field}: {raw}"),
        )),
    }
}

/// 把文件字段写入上传目录；失败时已写入的内容会被删除
async fn receive_file(field: &mut Field) -> Result<ReceivedFile, HttpResponse> {
    let config = AppConfig::get();

    let original_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(|s| s.to_string())
        .unwrap_or_default();
    let name = validate_name(&original_name)
        .map_err(|msg| bad_request(ErrorCode::FileNameInvalid, msg))?;

    let extension = Path::new(&name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();
    if !config
        .upload
        .allowed_extensions
        .iter()
        .any(|t| t.to_lowercase() == extension)
    {
        return Err(bad_request(ErrorCode::FileTypeNotAllowed, "File type not allowed"));
    }

    let content_type = field
        .content_type()
        .map(|ct| ct.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .map_err(|e| upload_failed(e.into()))?;

    let stored_name = format!("{}{}", Uuid::new_v4(), extension);
    let path = blob_path(&stored_name);
    let mut out = tokio::fs::File::create(&path)
        .await
        .map_err(|e| upload_failed(e.into()))?;

    let result = async {
        let mut head: Vec<u8> = Vec::with_capacity(HEAD_LEN);
        let mut checked = false;
        let mut total: usize = 0;

        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| bad_request(ErrorCode::FileUploadFailed, e.to_string()))?;
            total += data.len();
            if total > config.upload.max_size {
                return Err(bad_request(
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                ));
            }

            if checked {
                out.write_all(&data).await.map_err(|e| upload_failed(e.into()))?;
                continue;
            }

            head.extend_from_slice(&data);
            if head.len() >= HEAD_LEN {
                if !validate_magic_bytes(&head, &extension) {
                    return Err(bad_request(
                        ErrorCode::FileTypeNotAllowed,
                        "File content does not match its extension",
                    ));
                }
                checked = true;
                out.write_all(&head).await.map_err(|e| upload_failed(e.into()))?;
            }
        }

        if !checked {
            if !validate_magic_bytes(&head, &extension) {
                return Err(bad_request(
                    ErrorCode::FileTypeNotAllowed,
                    "File content does not match its extension",
                ));
            }
            out.write_all(&head).await.map_err(|e| upload_failed(e.into()))?;
        }
        out.flush().await.map_err(|e| upload_failed(e.into()))?;
        Ok(total as i64)
    }
    .await;

    match result {
        Ok(size) => Ok(ReceivedFile {
            name,
            stored_name,
            size,
            content_type,
        }),
        Err(resp) => {
            remove_blobs(std::slice::from_ref(&stored_name)).await;
            Err(resp)
        }
    }
}

async fn read_form(payload: &mut Multipart, form: &mut UploadForm) -> Result<(), HttpResponse> {
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(()),
            Err(e) => return Err(bad_request(ErrorCode::BadRequest, e.to_string())),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if form.file.is_some() {
                    return Err(bad_request(
                        ErrorCode::MultifileUploadNotAllowed,
                        "Only one file can be uploaded at a time",
                    ));
                }
                form.file = Some(receive_file(&mut field).await?);
            }
            "workspace_id" => form.workspace_id = parse_id(&read_text(&mut field).await?, &name)?,
            "folder_id" => form.folder_id = parse_id(&read_text(&mut field).await?, &name)?,
            "description" => {
                let text = read_text(&mut field).await?;
                form.description = normalize_note(Some(text))
                    .map_err(|msg| bad_request(ErrorCode::BadRequest, msg))?;
            }
            "labels" => {
                form.labels = parse_labels_field(&read_text(&mut field).await?)
                    .map_err(|msg| bad_request(ErrorCode::LabelInvalid, msg))?;
            }
            // 未知字段直接丢弃
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| bad_request(ErrorCode::BadRequest, e.to_string()))?;
                }
            }
        }
    }
}

pub async fn handle_upload(
    service: &FileService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(RequireJWT::unauthorized());
    };

    let mut form = UploadForm::default();
    let read = read_form(&mut payload, &mut form).await;

    let Some(file) = form.file.take() else {
        return Ok(match read {
            Err(resp) => resp,
            Ok(()) => bad_request(ErrorCode::FileNotFound, "No file found in upload payload"),
        });
    };

    let stored_name = file.stored_name.clone();
    let response = match read {
        Err(resp) => Err(resp),
        Ok(()) => save_record(service, request, &user, form, file).await,
    };

    match response {
        Ok(resp) => Ok(resp),
        Err(resp) => {
            remove_blobs(std::slice::from_ref(&stored_name)).await;
            Ok(resp)
        }
    }
}

async fn save_record(
    service: &FileService,
    request: &HttpRequest,
    user: &crate::models::users::entities::User,
    form: UploadForm,
    file: ReceivedFile,
) -> Result<HttpResponse, HttpResponse> {
    let Some(workspace_id) = form.workspace_id else {
        return Err(bad_request(ErrorCode::BadRequest, "workspace_id is required"));
    };

    let storage = service.get_storage(request);
    access::workspace_for_write(&storage, user, workspace_id).await?;
    if let Some(folder_id) = form.folder_id {
        access::folder_in_workspace(&storage, folder_id, workspace_id).await?;
    }

    let new_file = NewFile {
        workspace_id,
        folder_id: form.folder_id,
        user_id: user.id,
        name: file.name,
        description: form.description,
        labels: form.labels,
        stored_name: file.stored_name,
        file_size: file.size,
        content_type: file.content_type,
    };

    match storage.create_file(new_file).await {
        Ok(file) => {
            info!(
                "User {} uploaded file {} ({} bytes) to workspace {}",
                user.id, file.id, file.file_size, workspace_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                FileResponse { file },
                "File uploaded successfully",
            )))
        }
        Err(e) => Err(storage_error_response(&e, ErrorCode::FileUploadFailed)),
    }
}
