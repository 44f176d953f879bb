use domain::{Category, Club, Post, RecruitingStatus, Timestamp, User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 作者已不存在时显示的名称
pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: Uuid::from(user.id),
            name: user.name.clone(),
            email: user.email.as_str().to_owned(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: Uuid::from(category.id),
            name: category.name.clone(),
        }
    }
}

/// 社团列表项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSummaryDto {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub summary: String,
    pub logo_url: Option<String>,
    pub recruiting_status: RecruitingStatus,
    pub activity_cycle: Option<String>,
    pub has_fee: bool,
    pub like_count: u64,
    pub tags: Vec<String>,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub author_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClubSummaryDto {
    pub fn new(
        club: &Club,
        like_count: u64,
        category_name: Option<String>,
        author_name: Option<String>,
    ) -> Self {
        let details = &club.details;
        Self {
            id: Uuid::from(club.id),
            slug: club.slug.clone(),
            name: details.name.clone(),
            summary: details.summary.clone(),
            logo_url: details.logo_url.clone(),
            recruiting_status: details.recruiting_status,
            activity_cycle: details.activity_cycle.clone(),
            has_fee: details.has_fee,
            like_count,
            tags: details.tags.as_slice().to_vec(),
            category_id: Uuid::from(club.category_id),
            category_name,
            author_name: author_name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned()),
            created_at: club.created_at,
            updated_at: club.updated_at,
        }
    }
}

/// 社团详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDetailDto {
    #[serde(flatten)]
    pub summary: ClubSummaryDto,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub join_form_url: Option<String>,
    pub department: Option<String>,
    pub is_public: bool,
    pub is_liked: bool,
}

impl ClubDetailDto {
    pub fn new(club: &Club, summary: ClubSummaryDto, is_liked: bool) -> Self {
        let details = &club.details;
        Self {
            summary,
            description: details.description.clone(),
            banner_url: details.banner_url.clone(),
            join_form_url: details.join_form_url.clone(),
            department: details.department.clone(),
            is_public: details.is_public,
            is_liked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PostDto {
    pub fn new(post: &Post, author_name: Option<String>) -> Self {
        Self {
            id: Uuid::from(post.id),
            title: post.title.clone(),
            content: post.content.clone(),
            author_name: author_name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned()),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// 创建类接口返回的新资源 ID
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreatedDto {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlDto {
    pub presigned_url: String,
}
