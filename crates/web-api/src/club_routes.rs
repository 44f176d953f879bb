//! 社团与分类接口

use application::{
    services::CreateClubRequest, CategoryDto, ClubDetailDto, ClubSummaryDto, CreatedDto,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use domain::{CategoryId, ClubDetails, ClubId, Page, RecruitingStatus, TagList};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::ApiError,
    extract::{
        not_blank, ApiPath, ApiQuery, AuthUser, FieldOrder, OptionalAuthUser, PageQuery,
        ValidatedJson,
    },
    response::{ok, ApiResponse},
    state::AppState,
};

/// 创建与全量更新共用的社团资料
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ClubDetailsPayload {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Name must not be empty"),
        length(max = 20, message = "Name must be at most 20 characters")
    )]
    name: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Summary must not be empty"),
        length(max = 200, message = "Summary must be at most 200 characters")
    )]
    summary: String,
    description: Option<String>,
    #[validate(length(max = 2048, message = "Logo URL must be at most 2048 characters"))]
    logo_url: Option<String>,
    #[validate(length(max = 2048, message = "Banner URL must be at most 2048 characters"))]
    banner_url: Option<String>,
    #[validate(length(max = 2048, message = "Join form URL must be at most 2048 characters"))]
    join_form_url: Option<String>,
    #[validate(required(message = "Recruiting status must not be null"))]
    recruiting_status: Option<RecruitingStatus>,
    #[validate(length(max = 50, message = "Department must be at most 50 characters"))]
    department: Option<String>,
    #[validate(length(max = 50, message = "Activity cycle must be at most 50 characters"))]
    activity_cycle: Option<String>,
    #[serde(default)]
    has_fee: bool,
    #[serde(default)]
    is_public: bool,
    #[serde(default)]
    tags: Vec<String>,
}

const DETAIL_FIELDS: [&str; 12] = [
    "name",
    "summary",
    "description",
    "logo_url",
    "banner_url",
    "join_form_url",
    "recruiting_status",
    "department",
    "activity_cycle",
    "has_fee",
    "is_public",
    "tags",
];

impl FieldOrder for ClubDetailsPayload {
    const FIELDS: &'static [&'static str] = &DETAIL_FIELDS;
}

impl TryFrom<ClubDetailsPayload> for ClubDetails {
    type Error = ApiError;

    fn try_from(payload: ClubDetailsPayload) -> Result<Self, Self::Error> {
        Ok(ClubDetails {
            name: payload.name,
            summary: payload.summary,
            description: payload.description,
            logo_url: payload.logo_url,
            banner_url: payload.banner_url,
            join_form_url: payload.join_form_url,
            recruiting_status: payload.recruiting_status.unwrap_or_default(),
            department: payload.department,
            activity_cycle: payload.activity_cycle,
            has_fee: payload.has_fee,
            is_public: payload.is_public,
            tags: TagList::new(payload.tags)?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateClubPayload {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Slug must not be empty"),
        length(max = 100, message = "Slug must be at most 100 characters")
    )]
    slug: String,
    #[validate(required(message = "Category ID must not be null"))]
    category_id: Option<Uuid>,
    #[serde(flatten)]
    #[validate(nested)]
    details: ClubDetailsPayload,
}

impl FieldOrder for CreateClubPayload {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "slug",
        "summary",
        "description",
        "logo_url",
        "banner_url",
        "join_form_url",
        "recruiting_status",
        "department",
        "activity_cycle",
        "has_fee",
        "is_public",
        "tags",
        "category_id",
    ];
}

#[derive(Debug, Deserialize)]
struct TagSearchQuery {
    tag: Option<String>,
    page: Option<u32>,
    size: Option<u32>,
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/clubs", post(create_club).get(list_clubs))
        .route("/clubs/search", get(search_clubs))
        .route(
            "/clubs/{id}",
            get(get_club).put(update_club).delete(delete_club),
        )
        .route("/clubs/{id}/like", post(toggle_like))
        .route("/categories", get(list_categories))
}

async fn create_club(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateClubPayload>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedDto>>), ApiError> {
    let category_id = payload.category_id.map(CategoryId::new).ok_or_else(|| {
        ApiError::validation(&[("categoryId".into(), "Category ID must not be null".into())])
    })?;
    let request = CreateClubRequest {
        slug: payload.slug,
        category_id,
        details: payload.details.try_into()?,
    };

    let id = state.club_service.create_club(actor.user_id, request).await?;
    Ok((StatusCode::CREATED, ok(CreatedDto { id: id.0 })))
}

async fn list_clubs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ApiResponse<Page<ClubSummaryDto>>>, ApiError> {
    let page = state
        .club_service
        .list_public_clubs(query.to_request())
        .await?;
    Ok(ok(page))
}

async fn search_clubs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TagSearchQuery>,
) -> Result<Json<ApiResponse<Page<ClubSummaryDto>>>, ApiError> {
    let page = PageQuery {
        page: query.page,
        size: query.size,
    };
    let result = state
        .club_service
        .search_clubs_by_tag(query.tag.as_deref().unwrap_or_default(), page.to_request())
        .await?;
    Ok(ok(result))
}

async fn get_club(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ClubDetailDto>>, ApiError> {
    let detail = state
        .club_service
        .get_public_club(ClubId::new(id), viewer.map(|actor| actor.user_id))
        .await?;
    Ok(ok(detail))
}

async fn update_club(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ClubDetailsPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .club_service
        .update_club(actor, ClubId::new(id), payload.try_into()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_club(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.club_service.delete_club(actor, ClubId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let liked = state
        .club_service
        .toggle_like(actor.user_id, ClubId::new(id))
        .await?;
    Ok(ok(liked))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    Ok(ok(state.club_service.list_categories().await?))
}
