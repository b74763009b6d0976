use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            _ => Self::Internal,
        }
    }
}

/// Error body returned by the backend on non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Decodes a response body, falling back to the status code and raw text
    /// when the backend did not send a structured error.
    pub fn from_response(status: u16, body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| {
            let message = if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.trim().to_string()
            };
            Self::new(ErrorCode::from_status(status), message)
        })
    }
}

#[derive(Debug, Error)]
#[error("{code:?} (HTTP {status}): {message}")]
pub struct ApiException {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiException {
    pub fn new(status: u16, error: ApiError) -> Self {
        Self {
            status,
            code: error.code,
            message: error.message,
        }
    }
}

impl From<ApiException> for ApiError {
    fn from(value: ApiException) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_structured_error_body() {
        let err = ApiError::from_response(404, r#"{"code":"not_found","message":"no such employee"}"#);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "no such employee");
    }

    #[test]
    fn falls_back_to_status_for_unstructured_body() {
        let err = ApiError::from_response(500, "");
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "HTTP 500");

        let err = ApiError::from_response(401, "bad credentials\n");
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.message, "bad credentials");
    }
}
