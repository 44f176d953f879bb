//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理唯一性与存在性校验、权限判断，
//! 以及对外部适配器（密码哈希、对象存储签名、学校域名查询）的抽象。

pub mod actor;
pub mod clock;
pub mod dto;
pub mod error;
pub mod password;
pub mod repository;
pub mod services;
pub mod storage;
pub mod verification;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use actor::Actor;
pub use clock::{Clock, SystemClock};
pub use dto::{
    CategoryDto, ClubDetailDto, ClubSummaryDto, CreatedDto, PostDto, PresignedUrlDto, UserDto,
};
pub use error::ApplicationError;
pub use password::{PasswordHasher, PasswordHasherError};
pub use repository::{
    CategoryRepository, ClubFilter, ClubLikeRepository, ClubRepository, PostRepository,
    UserRepository,
};
pub use services::{
    ClubService, ClubServiceDependencies, EmailVerificationService, FileService, PostService,
    PostServiceDependencies, UserService, UserServiceDependencies,
};
pub use storage::{PresignedUrlGenerator, StorageError};
pub use verification::SchoolDomainVerifier;
