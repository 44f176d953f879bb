//! 领域模型错误定义
//!
//! 所有失败都归入一个封闭的 [`ErrorCode`] 目录。每个错误码属于唯一的
//! [`ErrorCategory`]，类别决定 HTTP 状态码，错误码本身提供稳定标识与默认消息。

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// 按可处理方式划分的错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// 请求本身有误，调用方修改后可重试
    Validation,
    /// 缺少或无效的凭证
    Auth,
    /// 已认证但无权访问
    Access,
    /// 资源不存在
    Resource,
    /// 违反业务规则
    Business,
    /// 触发限流
    Rate,
    /// 服务端内部错误
    System,
}

impl ErrorCategory {
    pub const fn status(self) -> u16 {
        match self {
            ErrorCategory::Validation => 400,
            ErrorCategory::Auth => 401,
            ErrorCategory::Access => 403,
            ErrorCategory::Resource => 404,
            ErrorCategory::Business => 409,
            ErrorCategory::Rate => 429,
            ErrorCategory::System => 500,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::Auth => "AUTH",
            ErrorCategory::Access => "ACCESS",
            ErrorCategory::Resource => "RESOURCE",
            ErrorCategory::Business => "BUSINESS",
            ErrorCategory::Rate => "RATE",
            ErrorCategory::System => "SYSTEM",
        }
    }

    /// 客户端错误（非 SYSTEM 类别）
    pub const fn is_client_error(self) -> bool {
        !matches!(self, ErrorCategory::System)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 错误码目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    InvalidEmailDomain,
    InvalidUrlFormat,
    AuthenticationRequired,
    InvalidToken,
    ExpiredToken,
    AccessDenied,
    InsufficientRole,
    PrivateResource,
    ResourceNotFound,
    DuplicateResource,
    AlreadyProcessed,
    StateConflict,
    RateLimitExceeded,
    InternalError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::InvalidInput,
        ErrorCode::InvalidEmailDomain,
        ErrorCode::InvalidUrlFormat,
        ErrorCode::AuthenticationRequired,
        ErrorCode::InvalidToken,
        ErrorCode::ExpiredToken,
        ErrorCode::AccessDenied,
        ErrorCode::InsufficientRole,
        ErrorCode::PrivateResource,
        ErrorCode::ResourceNotFound,
        ErrorCode::DuplicateResource,
        ErrorCode::AlreadyProcessed,
        ErrorCode::StateConflict,
        ErrorCode::RateLimitExceeded,
        ErrorCode::InternalError,
    ];

    pub const fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::InvalidInput | ErrorCode::InvalidEmailDomain | ErrorCode::InvalidUrlFormat => {
                ErrorCategory::Validation
            }
            ErrorCode::AuthenticationRequired | ErrorCode::InvalidToken | ErrorCode::ExpiredToken => {
                ErrorCategory::Auth
            }
            ErrorCode::AccessDenied | ErrorCode::InsufficientRole | ErrorCode::PrivateResource => {
                ErrorCategory::Access
            }
            ErrorCode::ResourceNotFound => ErrorCategory::Resource,
            ErrorCode::DuplicateResource | ErrorCode::AlreadyProcessed | ErrorCode::StateConflict => {
                ErrorCategory::Business
            }
            ErrorCode::RateLimitExceeded => ErrorCategory::Rate,
            ErrorCode::InternalError => ErrorCategory::System,
        }
    }

    /// HTTP 状态码，完全由类别决定
    pub const fn status(self) -> u16 {
        self.category().status()
    }

    /// 客户端用于分支判断的稳定标识
    pub const fn code(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidEmailDomain => "INVALID_EMAIL_DOMAIN",
            ErrorCode::InvalidUrlFormat => "INVALID_URL_FORMAT",
            ErrorCode::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::ExpiredToken => "EXPIRED_TOKEN",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::InsufficientRole => "INSUFFICIENT_ROLE",
            ErrorCode::PrivateResource => "PRIVATE_RESOURCE",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::DuplicateResource => "DUPLICATE_RESOURCE",
            ErrorCode::AlreadyProcessed => "ALREADY_PROCESSED",
            ErrorCode::StateConflict => "STATE_CONFLICT",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input.",
            ErrorCode::InvalidEmailDomain => "Email domain is not allowed.",
            ErrorCode::InvalidUrlFormat => "Invalid URL format.",
            ErrorCode::AuthenticationRequired => "Authentication is required.",
            ErrorCode::InvalidToken => "Invalid token.",
            ErrorCode::ExpiredToken => "Token has expired.",
            ErrorCode::AccessDenied => "Access denied.",
            ErrorCode::InsufficientRole => "Insufficient role.",
            ErrorCode::PrivateResource => "This resource is private.",
            ErrorCode::ResourceNotFound => "Requested resource was not found.",
            ErrorCode::DuplicateResource => "Resource already exists.",
            ErrorCode::AlreadyProcessed => "Request has already been processed.",
            ErrorCode::StateConflict => "Operation is not allowed in the current state.",
            ErrorCode::RateLimitExceeded => "Rate limit exceeded.",
            ErrorCode::InternalError => "An internal server error occurred.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 字段校验失败
    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 邮箱缺少合法域名
    #[error("email domain is not allowed: {email}")]
    InvalidEmailDomain { email: String },

    /// 缺少认证信息或凭证错误
    #[error("authentication required")]
    AuthenticationRequired,

    /// 非资源所有者的操作
    #[error("access denied: {action}")]
    AccessDenied { action: String },

    /// 角色不足
    #[error("role {required} required")]
    InsufficientRole { required: String },

    /// 资源不存在（包括已软删除和不可见的资源）
    #[error("{resource} not found: {id}")]
    NotFound {
        resource: &'static str,
        id: String,
    },

    /// 唯一键冲突
    #[error("{resource} already exists: {identifier}")]
    Duplicate {
        resource: &'static str,
        identifier: String,
    },
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_email_domain(email: impl Into<String>) -> Self {
        Self::InvalidEmailDomain {
            email: email.into(),
        }
    }

    pub fn access_denied(action: impl Into<String>) -> Self {
        Self::AccessDenied {
            action: action.into(),
        }
    }

    pub fn insufficient_role(required: impl Into<String>) -> Self {
        Self::InsufficientRole {
            required: required.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn duplicate(resource: &'static str, identifier: impl Into<String>) -> Self {
        Self::Duplicate {
            resource,
            identifier: identifier.into(),
        }
    }

    /// 该错误对应的错误码
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::InvalidArgument { .. } => ErrorCode::InvalidInput,
            DomainError::InvalidEmailDomain { .. } => ErrorCode::InvalidEmailDomain,
            DomainError::AuthenticationRequired => ErrorCode::AuthenticationRequired,
            DomainError::AccessDenied { .. } => ErrorCode::AccessDenied,
            DomainError::InsufficientRole { .. } => ErrorCode::InsufficientRole,
            DomainError::NotFound { .. } => ErrorCode::ResourceNotFound,
            DomainError::Duplicate { .. } => ErrorCode::DuplicateResource,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// 仓储层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint violated")]
    Conflict,
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_determined_by_category() {
        for code in ErrorCode::ALL {
            let expected = match code.category() {
                ErrorCategory::Validation => 400,
                ErrorCategory::Auth => 401,
                ErrorCategory::Access => 403,
                ErrorCategory::Resource => 404,
                ErrorCategory::Business => 409,
                ErrorCategory::Rate => 429,
                ErrorCategory::System => 500,
            };
            assert_eq!(code.status(), expected, "{code}");
        }
    }

    #[test]
    fn codes_are_unique_and_serialize_as_identifier() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.code()), "duplicate code {code}");
            assert!(!code.default_message().is_empty());

            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.code().to_owned()));
        }
    }

    #[test]
    fn domain_errors_resolve_to_catalog_codes() {
        assert_eq!(
            DomainError::duplicate("club", "x").code(),
            ErrorCode::DuplicateResource
        );
        assert_eq!(
            DomainError::not_found("club", 7).code().status(),
            404
        );
        assert_eq!(
            DomainError::invalid_argument("name", "must not be empty").to_string(),
            "name: must not be empty"
        );
        assert_eq!(
            DomainError::AuthenticationRequired.code().category(),
            ErrorCategory::Auth
        );
    }
}
