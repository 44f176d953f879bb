use application::{
    services::{CreatePostRequest, UpdatePostRequest},
    CreatedDto, PostDto,
};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use domain::{Page, PostId};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::ApiError,
    extract::{not_blank, ApiPath, ApiQuery, AuthUser, FieldOrder, PageQuery, ValidatedJson},
    response::{ok, ApiResponse},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
struct CreatePostPayload {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title must not be empty"))]
    title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Content must not be empty"))]
    content: String,
}

impl FieldOrder for CreatePostPayload {
    const FIELDS: &'static [&'static str] = &["title", "content"];
}

#[derive(Debug, Deserialize, Validate)]
struct UpdatePostPayload {
    #[validate(custom(function = "not_blank", message = "Title must not be empty"))]
    title: Option<String>,
    #[validate(custom(function = "not_blank", message = "Content must not be empty"))]
    content: Option<String>,
}

impl FieldOrder for UpdatePostPayload {
    const FIELDS: &'static [&'static str] = &["title", "content"];
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

async fn create_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePostPayload>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedDto>>), ApiError> {
    let id = state
        .post_service
        .create_post(
            actor.user_id,
            CreatePostRequest {
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, ok(CreatedDto { id: id.0 })))
}

async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Page<PostDto>>>, ApiError> {
    Ok(ok(state.post_service.list_posts(query.to_request()).await?))
}

async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<PostDto>>, ApiError> {
    Ok(ok(state.post_service.get_post(PostId::new(id)).await?))
}

async fn update_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePostPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .post_service
        .update_post(
            actor,
            PostId::new(id),
            UpdatePostRequest {
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete_post(actor, PostId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
