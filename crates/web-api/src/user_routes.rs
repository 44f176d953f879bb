use application::{services::UpdateProfileRequest, UserDto};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use domain::Page;
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::ApiError,
    extract::{not_blank, ApiQuery, AuthUser, FieldOrder, PageQuery, ValidatedJson},
    response::{ok, ApiResponse},
    state::AppState,
};

/// 只更新出现的字段
#[derive(Debug, Deserialize, Validate)]
struct UpdateProfilePayload {
    #[validate(
        custom(function = "not_blank", message = "Name must not be empty"),
        length(max = 50, message = "Name must be at most 50 characters")
    )]
    name: Option<String>,
}

impl FieldOrder for UpdateProfilePayload {
    const FIELDS: &'static [&'static str] = &["name"];
}

#[derive(Debug, Deserialize, Validate)]
struct CheckEmailPayload {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Email must not be empty"))]
    email: String,
}

impl FieldOrder for CheckEmailPayload {
    const FIELDS: &'static [&'static str] = &["email"];
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/me",
            get(current_user).patch(update_profile).delete(delete_account),
        )
        .route("/users/check-email", post(check_email))
}

async fn current_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    Ok(ok(state.user_service.get_user(actor.user_id).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfilePayload>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let dto = state
        .user_service
        .update_profile(actor.user_id, UpdateProfileRequest { name: payload.name })
        .await?;
    Ok(ok(dto))
}

async fn delete_account(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<StatusCode, ApiError> {
    state.user_service.delete_account(actor.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Page<UserDto>>>, ApiError> {
    let page = state
        .user_service
        .list_users(actor, query.to_request())
        .await?;
    Ok(ok(page))
}

async fn check_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CheckEmailPayload>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let is_school = state.email_service.is_school_email(&payload.email).await?;
    Ok(ok(is_school))
}
