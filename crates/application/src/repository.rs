//! 仓储接口
//!
//! 所有读取方法只返回未软删除的记录；软删除的记录对调用方等同于不存在。

use std::collections::HashMap;

use async_trait::async_trait;
use domain::{
    Category, CategoryId, Club, ClubId, Email, Page, PageRequest, Post, PostId, RepositoryError,
    Timestamp, User, UserId,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
    async fn update(&self, user: User) -> Result<User, RepositoryError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;
    async fn list(&self, page: PageRequest) -> Result<Page<User>, RepositoryError>;
    async fn soft_delete(&self, id: UserId, at: Timestamp) -> Result<(), RepositoryError>;
}

/// 社团列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubFilter {
    pub public_only: bool,
    pub tag: Option<String>,
}

impl ClubFilter {
    pub fn public() -> Self {
        Self {
            public_only: true,
            tag: None,
        }
    }

    pub fn public_with_tag(tag: impl Into<String>) -> Self {
        Self {
            public_only: true,
            tag: Some(tag.into()),
        }
    }

    pub fn matches(&self, club: &Club) -> bool {
        if self.public_only && !club.is_public() {
            return false;
        }
        match &self.tag {
            Some(tag) => club.details.tags.contains(tag),
            None => true,
        }
    }
}

#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn create(&self, club: Club) -> Result<Club, RepositoryError>;
    async fn update(&self, club: Club) -> Result<Club, RepositoryError>;
    async fn find_by_id(&self, id: ClubId) -> Result<Option<Club>, RepositoryError>;
    async fn exists_by_slug(&self, slug: &str) -> Result<bool, RepositoryError>;
    /// 按创建时间倒序分页
    async fn list(&self, filter: &ClubFilter, page: PageRequest)
        -> Result<Page<Club>, RepositoryError>;
    async fn soft_delete(&self, id: ClubId, at: Timestamp) -> Result<(), RepositoryError>;
}

/// 点赞关系（用户与社团的关联表），两端实体都不持有反向引用
#[async_trait]
pub trait ClubLikeRepository: Send + Sync {
    /// 原子地切换点赞状态，返回切换后的状态
    async fn toggle(
        &self,
        user_id: UserId,
        club_id: ClubId,
        at: Timestamp,
    ) -> Result<bool, RepositoryError>;
    async fn exists(&self, user_id: UserId, club_id: ClubId) -> Result<bool, RepositoryError>;
    async fn count_by_club(&self, club_id: ClubId) -> Result<u64, RepositoryError>;
    async fn count_by_clubs(
        &self,
        club_ids: &[ClubId],
    ) -> Result<HashMap<ClubId, u64>, RepositoryError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Category>, RepositoryError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, RepositoryError>;
    async fn update(&self, post: Post) -> Result<Post, RepositoryError>;
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError>;
    /// 按创建时间倒序分页
    async fn list(&self, page: PageRequest) -> Result<Page<Post>, RepositoryError>;
    async fn soft_delete(&self, id: PostId, at: Timestamp) -> Result<(), RepositoryError>;
}
