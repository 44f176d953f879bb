use std::collections::HashMap;

use application::repository::ClubLikeRepository;
use async_trait::async_trait;
use domain::{ClubId, RepositoryError, Timestamp, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_sqlx_err;

/// 点赞关联表 `club_likes`，主键 `(user_id, club_id)`
#[derive(Clone)]
pub struct PgClubLikeRepository {
    pool: PgPool,
}

impl PgClubLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClubLikeRepository for PgClubLikeRepository {
    /// 在一个事务内先尝试删除，没有删除到行时再插入；
    /// 插入被并发请求抢先时返回 `false`
    async fn toggle(
        &self,
        user_id: UserId,
        club_id: ClubId,
        at: Timestamp,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let removed = sqlx::query("DELETE FROM club_likes WHERE user_id = $1 AND club_id = $2")
            .bind(Uuid::from(user_id))
            .bind(Uuid::from(club_id))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected();

        let liked = if removed > 0 {
            false
        } else {
            sqlx::query(
                r#"
                INSERT INTO club_likes (user_id, club_id, created_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, club_id) DO NOTHING
                "#,
            )
            .bind(Uuid::from(user_id))
            .bind(Uuid::from(club_id))
            .bind(at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .rows_affected()
                > 0
        };

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(liked)
    }

    async fn exists(&self, user_id: UserId, club_id: ClubId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM club_likes WHERE user_id = $1 AND club_id = $2)",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(club_id))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn count_by_club(&self, club_id: ClubId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM club_likes WHERE club_id = $1")
            .bind(Uuid::from(club_id))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn count_by_clubs(
        &self,
        club_ids: &[ClubId],
    ) -> Result<HashMap<ClubId, u64>, RepositoryError> {
        if club_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Uuid> = club_ids.iter().copied().map(Uuid::from).collect();
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT club_id, COUNT(*) FROM club_likes
            WHERE club_id = ANY($1)
            GROUP BY club_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows
            .into_iter()
            .map(|(club_id, count)| {
                (
                    ClubId::from(club_id),
                    u64::try_from(count).unwrap_or_default(),
                )
            })
            .collect())
    }
}
