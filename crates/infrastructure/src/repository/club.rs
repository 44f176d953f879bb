use application::repository::{ClubFilter, ClubRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    CategoryId, Club, ClubDetails, ClubId, Page, PageRequest, RecruitingStatus, RepositoryError,
    TagList, Timestamp, UserId,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{invalid_data, map_sqlx_err, page_bounds, soft_delete_row, to_page, LIVE};

const CLUB_COLUMNS: &str = "id, slug, name, summary, description, logo_url, banner_url, \
    join_form_url, recruiting_status, department, activity_cycle, has_fee, is_public, tags, \
    category_id, author_id, created_at, updated_at, deleted_at";

/// `$1` 为是否只看公开社团，`$2` 为标签匹配模式（NULL 表示不过滤）
const FILTER_CLAUSE: &str = "(NOT $1 OR is_public) \
    AND ($2::text IS NULL OR tags LIKE $2 ESCAPE '\\')";

#[derive(Debug, FromRow)]
struct ClubRecord {
    id: Uuid,
    slug: String,
    name: String,
    summary: String,
    description: Option<String>,
    logo_url: Option<String>,
    banner_url: Option<String>,
    join_form_url: Option<String>,
    recruiting_status: String,
    department: Option<String>,
    activity_cycle: Option<String>,
    has_fee: bool,
    is_public: bool,
    tags: Option<String>,
    category_id: Uuid,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ClubRecord> for Club {
    type Error = RepositoryError;

    fn try_from(value: ClubRecord) -> Result<Self, Self::Error> {
        let recruiting_status = RecruitingStatus::parse(&value.recruiting_status)
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(Club {
            id: ClubId::from(value.id),
            slug: value.slug,
            details: ClubDetails {
                name: value.name,
                summary: value.summary,
                description: value.description,
                logo_url: value.logo_url,
                banner_url: value.banner_url,
                join_form_url: value.join_form_url,
                recruiting_status,
                department: value.department,
                activity_cycle: value.activity_cycle,
                has_fee: value.has_fee,
                is_public: value.is_public,
                tags: TagList::from_column(value.tags.as_deref()),
            },
            category_id: CategoryId::from(value.category_id),
            author_id: UserId::from(value.author_id),
            created_at: value.created_at,
            updated_at: value.updated_at,
            deleted_at: value.deleted_at,
        })
    }
}

#[derive(Clone)]
pub struct PgClubRepository {
    pool: PgPool,
}

impl PgClubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClubRepository for PgClubRepository {
    async fn create(&self, club: Club) -> Result<Club, RepositoryError> {
        let details = &club.details;
        let record = sqlx::query_as::<_, ClubRecord>(&format!(
            r#"
            INSERT INTO clubs (
                id, slug, name, summary, description, logo_url, banner_url, join_form_url,
                recruiting_status, department, activity_cycle, has_fee, is_public, tags,
                category_id, author_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {CLUB_COLUMNS}
            "#
        ))
        .bind(Uuid::from(club.id))
        .bind(&club.slug)
        .bind(&details.name)
        .bind(&details.summary)
        .bind(&details.description)
        .bind(&details.logo_url)
        .bind(&details.banner_url)
        .bind(&details.join_form_url)
        .bind(details.recruiting_status.as_str())
        .bind(&details.department)
        .bind(&details.activity_cycle)
        .bind(details.has_fee)
        .bind(details.is_public)
        .bind(details.tags.to_column())
        .bind(Uuid::from(club.category_id))
        .bind(Uuid::from(club.author_id))
        .bind(club.created_at)
        .bind(club.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Club::try_from(record)
    }

    async fn update(&self, club: Club) -> Result<Club, RepositoryError> {
        let details = &club.details;
        let record = sqlx::query_as::<_, ClubRecord>(&format!(
            r#"
            UPDATE clubs
            SET name = $2, summary = $3, description = $4, logo_url = $5, banner_url = $6,
                join_form_url = $7, recruiting_status = $8, department = $9,
                activity_cycle = $10, has_fee = $11, is_public = $12, tags = $13,
                updated_at = $14
            WHERE id = $1 AND {LIVE}
            RETURNING {CLUB_COLUMNS}
            "#
        ))
        .bind(Uuid::from(club.id))
        .bind(&details.name)
        .bind(&details.summary)
        .bind(&details.description)
        .bind(&details.logo_url)
        .bind(&details.banner_url)
        .bind(&details.join_form_url)
        .bind(details.recruiting_status.as_str())
        .bind(&details.department)
        .bind(&details.activity_cycle)
        .bind(details.has_fee)
        .bind(details.is_public)
        .bind(details.tags.to_column())
        .bind(club.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Club::try_from(record)
    }

    async fn find_by_id(&self, id: ClubId) -> Result<Option<Club>, RepositoryError> {
        let record = sqlx::query_as::<_, ClubRecord>(&format!(
            "SELECT {CLUB_COLUMNS} FROM clubs WHERE id = $1 AND {LIVE}"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Club::try_from).transpose()
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS (SELECT 1 FROM clubs WHERE slug = $1 AND {LIVE})"
        ))
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn list(
        &self,
        filter: &ClubFilter,
        page: PageRequest,
    ) -> Result<Page<Club>, RepositoryError> {
        let (limit, offset) = page_bounds(page);
        let pattern = filter.tag.as_deref().map(TagList::search_pattern);

        let records = sqlx::query_as::<_, ClubRecord>(&format!(
            r#"
            SELECT {CLUB_COLUMNS} FROM clubs
            WHERE {LIVE} AND {FILTER_CLAUSE}
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.public_only)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM clubs WHERE {LIVE} AND {FILTER_CLAUSE}"
        ))
        .bind(filter.public_only)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let clubs = records
            .into_iter()
            .map(Club::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(to_page(clubs, page, total))
    }

    async fn soft_delete(&self, id: ClubId, at: Timestamp) -> Result<(), RepositoryError> {
        soft_delete_row(&self.pool, "clubs", Uuid::from(id), at).await
    }
}
