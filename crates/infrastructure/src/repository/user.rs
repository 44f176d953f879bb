use application::repository::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Email, Page, PageRequest, PasswordHash, RepositoryError, Timestamp, User, UserId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{invalid_data, map_sqlx_err, page_bounds, soft_delete_row, to_page, LIVE};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, created_at, updated_at, deleted_at";

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let email = Email::parse(value.email).map_err(|err| invalid_data(err.to_string()))?;
        let password =
            PasswordHash::new(value.password_hash).map_err(|err| invalid_data(err.to_string()))?;
        let role = value
            .role
            .parse()
            .map_err(|err: domain::DomainError| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::from(value.id),
            name: value.name,
            email,
            password,
            role,
            created_at: value.created_at,
            updated_at: value.updated_at,
            deleted_at: value.deleted_at,
        })
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::from(user.id))
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.password.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        User::try_from(record)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users
            SET name = $2, password_hash = $3, role = $4, updated_at = $5
            WHERE id = $1 AND {LIVE}
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::from(user.id))
        .bind(&user.name)
        .bind(user.password.as_str())
        .bind(user.role.as_str())
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        User::try_from(record)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND {LIVE}"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND {LIVE}"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(User::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) AND {LIVE}"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(User::try_from).collect()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, RepositoryError> {
        let (limit, offset) = page_bounds(page);
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE {LIVE}
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {LIVE}"))
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        let users = records
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(to_page(users, page, total))
    }

    async fn soft_delete(&self, id: UserId, at: Timestamp) -> Result<(), RepositoryError> {
        soft_delete_row(&self.pool, "users", Uuid::from(id), at).await
    }
}
