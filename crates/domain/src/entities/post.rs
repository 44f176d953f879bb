//! 帖子实体定义

use super::SoftDelete;
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{PostId, Timestamp, UserId};

pub const MAX_TITLE_LENGTH: usize = 200;

/// 帖子实体
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Post {
    pub fn create(
        id: PostId,
        author_id: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            title: validate_title(title.into())?,
            content: validate_content(content.into())?,
            author_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// 仅修改传入的字段
    pub fn edit(
        &mut self,
        title: Option<String>,
        content: Option<String>,
        now: Timestamp,
    ) -> DomainResult<()> {
        let title = title.map(validate_title).transpose()?;
        let content = content.map(validate_content).transpose()?;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn soft_delete(&mut self, now: Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

impl SoftDelete for Post {
    fn deleted_at(&self) -> Option<Timestamp> {
        self.deleted_at
    }
}

fn validate_title(title: String) -> DomainResult<String> {
    let title = title.trim().to_owned();
    if title.is_empty() {
        return Err(DomainError::invalid_argument("title", "Title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(DomainError::invalid_argument(
            "title",
            format!("Title must be at most {MAX_TITLE_LENGTH} characters"),
        ));
    }
    Ok(title)
}

fn validate_content(content: String) -> DomainResult<String> {
    if content.trim().is_empty() {
        return Err(DomainError::invalid_argument("content", "Content must not be empty"));
    }
    Ok(content)
}
