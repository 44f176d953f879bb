//! 基础设施层实现。
//!
//! 提供数据库仓储、密码哈希、对象存储签名与学校域名查询等适配器，
//! 实现应用层定义的接口。

pub mod migrations;
pub mod password;
pub mod repository;
pub mod storage;
pub mod verification;

pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{
    create_pg_pool, PgCategoryRepository, PgClubLikeRepository, PgClubRepository,
    PgPostRepository, PgStorage, PgUserRepository,
};
pub use storage::{S3Presigner, S3PresignerSettings};
pub use verification::{SwotClientError, SwotDomainVerifier};
