//! PostgreSQL 仓储实现
//!
//! 所有读取与更新语句都组合 [`LIVE`] 条件，软删除的记录不会返回给上层。

mod category;
mod club;
mod like;
mod post;
mod user;

use std::sync::Arc;

use domain::{Page, PageRequest, RepositoryError, Timestamp};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

pub use category::PgCategoryRepository;
pub use club::PgClubRepository;
pub use like::PgClubLikeRepository;
pub use post::PgPostRepository;
pub use user::PgUserRepository;

/// 唯一约束冲突
const UNIQUE_VIOLATION: &str = "23505";

/// 未被软删除的行
pub(crate) const LIVE: &str = "deleted_at IS NULL";

pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            RepositoryError::Conflict
        }
        _ => RepositoryError::storage(err.to_string()),
    }
}

pub(crate) fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

/// 将 `COUNT(*)` 结果与当前页内容组装成分页结果
pub(crate) fn to_page<T>(content: Vec<T>, page: PageRequest, total: i64) -> Page<T> {
    Page::new(content, page, u64::try_from(total).unwrap_or_default())
}

/// 标记删除时间；行不存在或已删除时返回 `NotFound`
pub(crate) async fn soft_delete_row(
    pool: &PgPool,
    table: &'static str,
    id: Uuid,
    at: Timestamp,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(&format!(
        "UPDATE {table} SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND {LIVE}"
    ))
    .bind(id)
    .bind(at)
    .execute(pool)
    .await
    .map_err(map_sqlx_err)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

pub(crate) fn page_bounds(page: PageRequest) -> (i64, i64) {
    (
        i64::try_from(page.limit()).unwrap_or(i64::MAX),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}

/// 按连接池组装的全部仓储
#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub club_repository: Arc<PgClubRepository>,
    pub like_repository: Arc<PgClubLikeRepository>,
    pub category_repository: Arc<PgCategoryRepository>,
    pub post_repository: Arc<PgPostRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            club_repository: Arc::new(PgClubRepository::new(pool.clone())),
            like_repository: Arc::new(PgClubLikeRepository::new(pool.clone())),
            category_repository: Arc::new(PgCategoryRepository::new(pool.clone())),
            post_repository: Arc::new(PgPostRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
