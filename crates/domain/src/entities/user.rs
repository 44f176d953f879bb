//! 用户实体定义

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::SoftDelete;
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{Email, PasswordHash, Timestamp, UserId};

pub const MAX_NAME_LENGTH: usize = 50;

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Guest,
    Member,
    Admin,
}

impl UserRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            UserRole::Guest => "GUEST",
            UserRole::Member => "MEMBER",
            UserRole::Admin => "ADMIN",
        }
    }

    /// 写入令牌 `role` 声明的权限名，例如 `ROLE_ADMIN`
    pub fn authority(self) -> String {
        format!("ROLE_{}", self.as_str())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    /// 同时接受 `ADMIN` 与 `ROLE_ADMIN` 两种写法
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.strip_prefix("ROLE_").unwrap_or(value);
        match name {
            "GUEST" => Ok(UserRole::Guest),
            "MEMBER" => Ok(UserRole::Member),
            "ADMIN" => Ok(UserRole::Admin),
            other => Err(DomainError::invalid_argument(
                "role",
                format!("unknown role {other}"),
            )),
        }
    }
}

/// 用户实体
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password: PasswordHash,
    pub role: UserRole,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl User {
    pub fn register(
        id: UserId,
        name: impl Into<String>,
        email: Email,
        password: PasswordHash,
        now: Timestamp,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: Self::validate_name(name.into())?,
            email,
            password,
            role: UserRole::default(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn rename(&mut self, name: impl Into<String>, now: Timestamp) -> DomainResult<()> {
        self.name = Self::validate_name(name.into())?;
        self.updated_at = now;
        Ok(())
    }

    pub fn soft_delete(&mut self, now: Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    fn validate_name(name: String) -> DomainResult<String> {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(DomainError::invalid_argument("name", "Name must not be blank"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::invalid_argument(
                "name",
                format!("Name must be at most {MAX_NAME_LENGTH} characters"),
            ));
        }
        Ok(name)
    }
}

impl SoftDelete for User {
    fn deleted_at(&self) -> Option<Timestamp> {
        self.deleted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User::register(
            UserId::generate(),
            "Kim",
            Email::parse("kim@knu.ac.kr").unwrap(),
            PasswordHash::new("hash").unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_users_are_guests() {
        let user = user();
        assert_eq!(user.role, UserRole::Guest);
        assert!(!user.is_deleted());
    }

    #[test]
    fn role_parses_with_or_without_prefix() {
        assert_eq!("ROLE_ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("MEMBER".parse::<UserRole>().unwrap(), UserRole::Member);
        assert!("ROLE_ROOT".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Guest.authority(), "ROLE_GUEST");
    }

    #[test]
    fn blank_rename_is_rejected_and_keeps_old_name() {
        let mut user = user();
        assert!(user.rename("   ", Utc::now()).is_err());
        assert_eq!(user.name, "Kim");
    }

    #[test]
    fn soft_delete_sets_marker() {
        let mut user = user();
        user.soft_delete(Utc::now());
        assert!(user.is_deleted());
    }
}
