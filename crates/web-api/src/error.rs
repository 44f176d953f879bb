//! 错误到 HTTP 响应的统一映射
//!
//! `From<ApplicationError>` 是唯一的分类入口。响应体只包含错误码的默认消息
//! （校验失败时附带字段明细）；内部细节随响应扩展传给日志中间件，不会返回给客户端。

use application::ApplicationError;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Request,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, ErrorCode, RepositoryError};

use crate::response::ApiResponse;

#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    /// 仅用于服务端日志
    detail: Option<String>,
}

/// 写入响应扩展，供 [`log_errors`] 读取
#[derive(Debug, Clone)]
pub struct ErrorLog {
    pub code: ErrorCode,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_owned(),
            detail: None,
        }
    }

    /// 默认消息后追加 `[field: message, ...]`
    pub fn validation(details: &[(String, String)]) -> Self {
        let code = ErrorCode::InvalidInput;
        let joined = details
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            code,
            message: format!("{} [{joined}]", code.default_message()),
            detail: None,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError).with_detail(detail)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidArgument { field, reason } => {
                ApiError::validation(&[(camel_case(&field), reason)])
            }
            other => ApiError::new(other.code()).with_detail(other.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(err) => ApiError::from(err),
            ApplicationError::Repository(RepositoryError::NotFound) => {
                ApiError::new(ErrorCode::ResourceNotFound)
            }
            ApplicationError::Repository(RepositoryError::Conflict) => {
                ApiError::new(ErrorCode::DuplicateResource)
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorCode::InvalidInput).with_detail(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ErrorCode::InvalidInput).with_detail(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(ErrorCode::InvalidInput).with_detail(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(ApiResponse::error(self.message))).into_response();
        response.extensions_mut().insert(ErrorLog {
            code: self.code,
            detail: self.detail,
        });
        response
    }
}

/// 每个错误响应记录一次日志：客户端错误为 warn，SYSTEM 类别为 error
pub async fn log_errors(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    if let Some(log) = response.extensions().get::<ErrorLog>() {
        let detail = log.detail.as_deref().unwrap_or_default();
        if log.code.category().is_client_error() {
            tracing::warn!(%path, code = %log.code, detail, "request failed");
        } else {
            tracing::error!(%path, code = %log.code, detail, "request failed with internal error");
        }
    }
    response
}

/// 未匹配任何路由
pub async fn not_found() -> ApiError {
    ApiError::new(ErrorCode::ResourceNotFound)
}

/// 路径存在但请求方法不受支持，按输入错误处理
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(ErrorCode::InvalidInput)
}

/// `catch_panic` 的响应构造
pub fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic".to_owned()
    };
    ApiError::internal(format!("handler panicked: {detail}")).into_response()
}

/// `recruiting_status` -> `recruitingStatus`；已是驼峰的名称保持不变
pub(crate) fn camel_case(field: &str) -> String {
    let mut result = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            result.extend(ch.to_uppercase());
            upper = false;
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::StorageError;

    #[test]
    fn domain_errors_keep_their_code() {
        let error = ApiError::from(ApplicationError::from(DomainError::duplicate("club", "x")));
        assert_eq!(error.code(), ErrorCode::DuplicateResource);
        assert_eq!(error.status(), StatusCode::CONFLICT);
        assert_eq!(error.message(), "Resource already exists.");
    }

    #[test]
    fn invalid_argument_lists_the_field() {
        let error = ApiError::from(ApplicationError::from(DomainError::invalid_argument(
            "recruiting_status",
            "unknown status OPENED",
        )));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error.message(),
            "Invalid input. [recruitingStatus: unknown status OPENED]"
        );
    }

    #[test]
    fn internal_failures_do_not_leak() {
        let error = ApiError::from(ApplicationError::from(StorageError::Signing(
            "secret key rejected".into(),
        )));
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert_eq!(error.message(), "An internal server error occurred.");
        assert!(error.detail.as_deref().unwrap().contains("secret key rejected"));
    }

    #[test]
    fn repository_conflict_is_duplicate() {
        let error = ApiError::from(ApplicationError::from(RepositoryError::Conflict));
        assert_eq!(error.code(), ErrorCode::DuplicateResource);
        let error = ApiError::from(ApplicationError::from(RepositoryError::storage("io")));
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[test]
    fn validation_message_keeps_order() {
        let error = ApiError::validation(&[
            ("name".into(), "Name must not be empty".into()),
            ("slug".into(), "Slug must not be empty".into()),
        ]);
        assert_eq!(
            error.message(),
            "Invalid input. [name: Name must not be empty, slug: Slug must not be empty]"
        );
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("category_id"), "categoryId");
        assert_eq!(camel_case("fileName"), "fileName");
        assert_eq!(camel_case("name"), "name");
    }
}
