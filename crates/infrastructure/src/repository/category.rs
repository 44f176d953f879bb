use application::repository::CategoryRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Category, CategoryId, RepositoryError};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::map_sqlx_err;

#[derive(Debug, FromRow)]
struct CategoryRecord {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRecord> for Category {
    fn from(value: CategoryRecord) -> Self {
        Category {
            id: CategoryId::from(value.id),
            name: value.name,
            created_at: value.created_at,
        }
    }
}

/// 分类由迁移脚本预置，只读
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name, created_at FROM categories WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(Category::from))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(Category::from).collect())
    }
}
