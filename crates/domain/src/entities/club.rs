//! 社团实体定义

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SoftDelete;
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{CategoryId, ClubId, Timestamp, UserId};

pub const MAX_SLUG_LENGTH: usize = 100;
pub const MAX_NAME_LENGTH: usize = 20;
pub const MAX_SUMMARY_LENGTH: usize = 200;
pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_SHORT_TEXT_LENGTH: usize = 50;

const TAG_DELIMITER: char = ';';

/// 招募状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecruitingStatus {
    #[default]
    Open,
    Closed,
}

impl RecruitingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            RecruitingStatus::Open => "OPEN",
            RecruitingStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value {
            "OPEN" => Ok(RecruitingStatus::Open),
            "CLOSED" => Ok(RecruitingStatus::Closed),
            other => Err(DomainError::invalid_argument(
                "recruiting_status",
                format!("unknown status {other}"),
            )),
        }
    }
}

impl fmt::Display for RecruitingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 标签列表：去首尾空白、去空、去重并保持原有顺序。
///
/// 持久化为单列 `;a;b;`，空列表存为 NULL，按标签检索时匹配 `;tag;`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new<I, S>(tags: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if tag.is_empty() {
                continue;
            }
            if tag.contains(TAG_DELIMITER) {
                return Err(DomainError::invalid_argument(
                    "tags",
                    format!("Tag must not contain '{TAG_DELIMITER}'"),
                ));
            }
            if !normalized.iter().any(|existing| existing == tag) {
                normalized.push(tag.to_owned());
            }
        }
        Ok(Self(normalized))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.0.iter().any(|existing| existing == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_column(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(format!(
            "{TAG_DELIMITER}{}{TAG_DELIMITER}",
            self.0.join(&TAG_DELIMITER.to_string())
        ))
    }

    pub fn from_column(column: Option<&str>) -> Self {
        let tags = column
            .unwrap_or_default()
            .split(TAG_DELIMITER)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect();
        Self(tags)
    }

    /// 标签检索用的 LIKE 模式，转义字符为 `\`
    pub fn search_pattern(tag: &str) -> String {
        let mut escaped = String::with_capacity(tag.len());
        for c in tag.trim().chars() {
            if matches!(c, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        format!("%{TAG_DELIMITER}{escaped}{TAG_DELIMITER}%")
    }
}

/// 社团的可变资料，所有可选项都有明确的默认值
#[derive(Debug, Clone, PartialEq)]
pub struct ClubDetails {
    pub name: String,
    pub summary: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub join_form_url: Option<String>,
    pub recruiting_status: RecruitingStatus,
    pub department: Option<String>,
    pub activity_cycle: Option<String>,
    pub has_fee: bool,
    pub is_public: bool,
    pub tags: TagList,
}

impl Default for ClubDetails {
    fn default() -> Self {
        Self {
            name: String::new(),
            summary: String::new(),
            description: None,
            logo_url: None,
            banner_url: None,
            join_form_url: None,
            recruiting_status: RecruitingStatus::Open,
            department: None,
            activity_cycle: None,
            has_fee: false,
            is_public: false,
            tags: TagList::default(),
        }
    }
}

impl ClubDetails {
    fn validate(self) -> DomainResult<Self> {
        let name = required("name", &self.name, MAX_NAME_LENGTH)?;
        let summary = required("summary", &self.summary, MAX_SUMMARY_LENGTH)?;
        for (field, value) in [
            ("logo_url", &self.logo_url),
            ("banner_url", &self.banner_url),
            ("join_form_url", &self.join_form_url),
        ] {
            max_length(field, value.as_deref(), MAX_URL_LENGTH)?;
        }
        max_length("department", self.department.as_deref(), MAX_SHORT_TEXT_LENGTH)?;
        max_length("activity_cycle", self.activity_cycle.as_deref(), MAX_SHORT_TEXT_LENGTH)?;
        Ok(Self {
            name,
            summary,
            ..self
        })
    }
}

/// 社团实体
#[derive(Debug, Clone, PartialEq)]
pub struct Club {
    pub id: ClubId,
    /// 全局唯一且创建后不可修改
    pub slug: String,
    pub details: ClubDetails,
    pub category_id: CategoryId,
    pub author_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Club {
    pub fn create(
        id: ClubId,
        slug: impl Into<String>,
        category_id: CategoryId,
        author_id: UserId,
        details: ClubDetails,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let slug = required("slug", &slug.into(), MAX_SLUG_LENGTH)?;
        Ok(Self {
            id,
            slug,
            details: details.validate()?,
            category_id,
            author_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// 覆盖全部可变资料，标识字段（id、slug、作者）保持不变
    pub fn update(&mut self, details: ClubDetails, now: Timestamp) -> DomainResult<()> {
        self.details = details.validate()?;
        self.updated_at = now;
        Ok(())
    }

    pub fn soft_delete(&mut self, now: Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_public(&self) -> bool {
        self.details.is_public
    }

    pub fn is_managed_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }
}

impl SoftDelete for Club {
    fn deleted_at(&self) -> Option<Timestamp> {
        self.deleted_at
    }
}

fn required(field: &str, value: &str, max: usize) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::invalid_argument(field, "must not be empty"));
    }
    max_length(field, Some(value), max)?;
    Ok(value.to_owned())
}

fn max_length(field: &str, value: Option<&str>, max: usize) -> DomainResult<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(DomainError::invalid_argument(
            field,
            format!("must be at most {max} characters"),
        )),
        _ => Ok(()),
    }
}
