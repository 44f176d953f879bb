//! 注册与登录

use application::services::{AuthenticateUserRequest, RegisterUserRequest};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::TokenInfo,
    error::ApiError,
    extract::{not_blank, FieldOrder, ValidatedJson},
    response::{ok, ApiResponse},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
struct SignupPayload {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name must not be empty"),
        length(max = 50, message = "Name must be at most 50 characters")
    )]
    name: String,
    #[serde(default)]
    #[validate(email(message = "Email must be a valid address"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
}

impl FieldOrder for SignupPayload {
    const FIELDS: &'static [&'static str] = &["name", "email", "password"];
}

#[derive(Debug, Deserialize, Validate)]
struct LoginPayload {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Email must not be empty"))]
    email: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Password must not be empty"))]
    password: String,
}

impl FieldOrder for LoginPayload {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupPayload>,
) -> Result<(StatusCode, Json<ApiResponse<TokenInfo>>), ApiError> {
    let user = state
        .user_service
        .register(RegisterUserRequest {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let token = state.jwt.issue(user.id, user.role)?;
    Ok((StatusCode::CREATED, ok(token)))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<ApiResponse<TokenInfo>>, ApiError> {
    let user = state
        .user_service
        .authenticate(AuthenticateUserRequest {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(ok(state.jwt.issue(user.id, user.role)?))
}
