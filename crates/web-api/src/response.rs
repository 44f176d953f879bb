//! 统一响应包装 `{status, message, data}`

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// 成功时只填充 `data`，失败时只填充 `message`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// 处理函数里最常用的成功响应
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_has_null_message() {
        let value = serde_json::to_value(ApiResponse::success(json!({"id": 1}))).unwrap();
        assert_eq!(
            value,
            json!({"status": "SUCCESS", "message": null, "data": {"id": 1}})
        );
    }

    #[test]
    fn error_envelope_has_null_data() {
        let value = serde_json::to_value(ApiResponse::error("Access denied.")).unwrap();
        assert_eq!(
            value,
            json!({"status": "ERROR", "message": "Access denied.", "data": null})
        );
    }
}
