use application::repository::PostRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Page, PageRequest, Post, PostId, RepositoryError, Timestamp, UserId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{map_sqlx_err, page_bounds, soft_delete_row, to_page, LIVE};

const POST_COLUMNS: &str = "id, title, content, author_id, created_at, updated_at, deleted_at";

#[derive(Debug, FromRow)]
struct PostRecord {
    id: Uuid,
    title: String,
    content: String,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<PostRecord> for Post {
    fn from(value: PostRecord) -> Self {
        Post {
            id: PostId::from(value.id),
            title: value.title,
            content: value.content,
            author_id: UserId::from(value.author_id),
            created_at: value.created_at,
            updated_at: value.updated_at,
            deleted_at: value.deleted_at,
        }
    }
}

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: Post) -> Result<Post, RepositoryError> {
        let record = sqlx::query_as::<_, PostRecord>(&format!(
            r#"
            INSERT INTO posts (id, title, content, author_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::from(post.id))
        .bind(&post.title)
        .bind(&post.content)
        .bind(Uuid::from(post.author_id))
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(Post::from(record))
    }

    async fn update(&self, post: Post) -> Result<Post, RepositoryError> {
        let record = sqlx::query_as::<_, PostRecord>(&format!(
            r#"
            UPDATE posts SET title = $2, content = $3, updated_at = $4
            WHERE id = $1 AND {LIVE}
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::from(post.id))
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(Post::from(record))
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let record = sqlx::query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND {LIVE}"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(Post::from))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Post>, RepositoryError> {
        let (limit, offset) = page_bounds(page);
        let records = sqlx::query_as::<_, PostRecord>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE {LIVE}
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM posts WHERE {LIVE}"))
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        Ok(to_page(
            records.into_iter().map(Post::from).collect(),
            page,
            total,
        ))
    }

    async fn soft_delete(&self, id: PostId, at: Timestamp) -> Result<(), RepositoryError> {
        soft_delete_row(&self.pool, "posts", Uuid::from(id), at).await
    }
}
