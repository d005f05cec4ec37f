use thiserror::Error;

use crate::models::ErrorEnvelope;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Validation and business-rule failures (4xx other than 401/403/404)
    #[error("{message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid id: {0:?}")]
    InvalidId(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build an error from a non-success status. The backend's
    /// `{ "error": { "message" } }` payload is preferred; otherwise the raw
    /// body (truncated) is used.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (
                envelope.error.code().map(str::to_string),
                envelope.error.message().to_string(),
            ),
            Err(_) => (None, Self::truncate_body(body)),
        };
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            500..=599 => ApiError::ServerError(message),
            other => ApiError::Rejected {
                status: other,
                code,
                message: if message.is_empty() {
                    format!("Request failed with status {}", status)
                } else {
                    message
                },
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// The message the backend sent with the failure, if there was one.
    pub fn backend_message(&self) -> Option<&str> {
        let message = match self {
            ApiError::Unauthorized { message }
            | ApiError::AccessDenied(message)
            | ApiError::NotFound(message)
            | ApiError::ServerError(message)
            | ApiError::Rejected { message, .. } => message.as_str(),
            _ => return None,
        };
        Some(message).filter(|m| !m.trim().is_empty())
    }

    /// Text suitable for showing to a user. Backend messages are passed
    /// through verbatim; transport failures get a generic message.
    pub fn user_message(&self) -> String {
        match self.backend_message() {
            Some(message) => message.to_string(),
            None => match self {
                ApiError::Unauthorized { .. } => "Your session has expired. Please log in again.".to_string(),
                ApiError::NetworkError(_) => "Could not reach the server. Please try again.".to_string(),
                ApiError::InvalidId(_) => self.to_string(),
                _ => "Something went wrong. Please try again.".to_string(),
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Storage(format!("{:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_prefers_backend_message() {
        let body = r#"{"success":false,"error":{"code":"BAD_REQUEST","message":"title is required"}}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);
        match &err {
            ApiError::Rejected { status, code, message } => {
                assert_eq!(*status, 400);
                assert_eq!(code.as_deref(), Some("BAD_REQUEST"));
                assert_eq!(message, "title is required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), "title is required");
    }

    #[test]
    fn test_from_status_maps_auth_failures() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":"UNAUTHORIZED","message":"Invalid email or password"}}"#,
        );
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Invalid email or password");

        let bare = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(bare.user_message(), "Your session has expired. Please log in again.");

        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(m) if m == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_plain_string_error_payload() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Failed to mark notification as read"}"#,
        );
        assert_eq!(err.user_message(), "Failed to mark notification as read");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(2000);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.len() < 600);
        assert!(truncated.contains("2000 total bytes"));

        // multi-byte characters straddling the limit
        let wide = "é".repeat(400);
        let truncated = ApiError::truncate_body(&wide);
        assert!(truncated.starts_with('é'));
    }

    #[test]
    fn test_rejected_without_message_gets_status_text() {
        let err = ApiError::from_status(StatusCode::CONFLICT, "");
        assert_eq!(err.to_string(), "Request failed with status 409 Conflict");
    }
}
