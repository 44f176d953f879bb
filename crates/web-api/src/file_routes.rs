//! 预签名 URL 发放，文件本身不经过本服务

use application::PresignedUrlDto;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::ApiError,
    extract::{not_blank, ApiQuery, AuthUser, FieldOrder, ValidatedJson},
    response::{ok, ApiResponse},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UploadUrlPayload {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "File name is required"))]
    file_name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Content type is required"))]
    content_type: String,
}

impl FieldOrder for UploadUrlPayload {
    const FIELDS: &'static [&'static str] = &["file_name", "content_type"];
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadUrlQuery {
    #[serde(default)]
    file_path: String,
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/files/upload-url", post(upload_url))
        .route("/files/download-url", get(download_url))
}

async fn upload_url(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    ValidatedJson(payload): ValidatedJson<UploadUrlPayload>,
) -> Result<Json<ApiResponse<PresignedUrlDto>>, ApiError> {
    let dto = state
        .file_service
        .generate_upload_url(&payload.file_name, &payload.content_type)?;
    Ok(ok(dto))
}

async fn download_url(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    ApiQuery(query): ApiQuery<DownloadUrlQuery>,
) -> Result<Json<ApiResponse<PresignedUrlDto>>, ApiError> {
    Ok(ok(state.file_service.generate_download_url(&query.file_path)?))
}
