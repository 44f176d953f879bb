//! 领域实体定义
//!
//! 包含系统的核心实体：用户、社团、帖子、分类。

pub mod category;
pub mod club;
pub mod post;
pub mod user;

pub use category::Category;
pub use club::{Club, ClubDetails, RecruitingStatus, TagList};
pub use post::Post;
pub use user::{User, UserRole};

use crate::value_objects::Timestamp;

/// 以删除时间戳标记删除的实体
pub trait SoftDelete {
    fn deleted_at(&self) -> Option<Timestamp>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
