//! HTTP 错误响应
//!
//! 所有错误都以 `{"error": "..."}` 返回。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::error::AppError;

/// 接口错误：状态码 + 返回给调用方的消息
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// 错误类别 → HTTP 状态码
pub fn status_for(err: &AppError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if matches!(err, AppError::NotFound(_)) {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "请求处理失败: {}", self.message);
        } else {
            warn!(status = %self.status, "请求被拒绝: {}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

pub type HttpResult<T> = Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, LlmError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AppError::validation("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ExtractionError::NoFile.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&LlmError::MissingApiKey.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&ExtractionError::UploadFailed { reason: "x".into() }.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_is_passed_through() {
        let err = HttpError::from(AppError::from(LlmError::MissingApiKey));
        assert_eq!(err.message, "LLM API key not configured");
    }
}
