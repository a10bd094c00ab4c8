use crate::core::session::Step;
use crate::utils::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CareMatchError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API responded with status {status}: {message}")]
    RemoteStatusError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(ValidationErrors),

    #[error("A match request is already in flight")]
    SubmissionInFlight,

    #[error("The match request was cancelled before its response was applied")]
    SubmissionCancelled,

    #[error("Cannot {action} on step {step}")]
    InvalidTransition { step: Step, action: &'static str },
}

pub type Result<T> = std::result::Result<T, CareMatchError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Remote,
    Configuration,
    Session,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// 依 HTTP 狀態碼分類的遠端錯誤，每一類對應一則固定的使用者訊息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Unprocessable,
    Server,
    Network,
    Other,
}

impl RemoteErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => RemoteErrorKind::BadRequest,
            401 => RemoteErrorKind::Unauthorized,
            403 => RemoteErrorKind::Forbidden,
            404 => RemoteErrorKind::NotFound,
            422 => RemoteErrorKind::Unprocessable,
            500..=599 => RemoteErrorKind::Server,
            _ => RemoteErrorKind::Other,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            RemoteErrorKind::BadRequest => {
                "The request data is invalid. Please check your information."
            }
            RemoteErrorKind::Unauthorized => "Please log in to continue.",
            RemoteErrorKind::Forbidden => "You do not have permission to perform this action.",
            RemoteErrorKind::NotFound => "The requested resource was not found.",
            RemoteErrorKind::Unprocessable => "Validation error. Please check your input data.",
            RemoteErrorKind::Server => "Server error. Please try again later.",
            RemoteErrorKind::Network => {
                "Network error. Please check your connection and try again."
            }
            RemoteErrorKind::Other => "Failed to process your request. Please try again.",
        }
    }
}

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

impl CareMatchError {
    pub fn config(message: impl Into<String>) -> Self {
        CareMatchError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CareMatchError::ApiError(e) if e.is_decode() => ErrorCategory::Remote,
            CareMatchError::ApiError(_) => ErrorCategory::Network,
            CareMatchError::RemoteStatusError { .. } => ErrorCategory::Remote,
            CareMatchError::IoError(_) | CareMatchError::SerializationError(_) => {
                ErrorCategory::System
            }
            CareMatchError::ConfigError { .. }
            | CareMatchError::InvalidConfigValueError { .. }
            | CareMatchError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CareMatchError::ValidationError(_) => ErrorCategory::Validation,
            CareMatchError::SubmissionInFlight
            | CareMatchError::SubmissionCancelled
            | CareMatchError::InvalidTransition { .. } => ErrorCategory::Session,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Session => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Validation | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 只有遠端呼叫失敗才有分類
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            CareMatchError::RemoteStatusError { status, .. } => {
                Some(RemoteErrorKind::from_status(*status))
            }
            CareMatchError::ApiError(e) => match e.status() {
                Some(status) => Some(RemoteErrorKind::from_status(status.as_u16())),
                None if e.is_connect() || e.is_timeout() || e.is_request() => {
                    Some(RemoteErrorKind::Network)
                }
                None => Some(RemoteErrorKind::Other),
            },
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        if let Some(kind) = self.remote_kind() {
            return kind.user_message().to_string();
        }

        match self {
            CareMatchError::ValidationError(errors) => errors
                .errors()
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join(" "),
            CareMatchError::ConfigError { message } => format!("Configuration problem: {}", message),
            CareMatchError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value for '{}' is invalid: {}", field, reason)
            }
            CareMatchError::ConfigValidationError { field, message } => {
                format!("Configuration '{}' could not be loaded: {}", field, message)
            }
            CareMatchError::SubmissionInFlight => {
                "Your request is still being processed. Please wait.".to_string()
            }
            CareMatchError::SubmissionCancelled => "The request was cancelled.".to_string(),
            CareMatchError::InvalidTransition { .. } => {
                "That action is not available at this step.".to_string()
            }
            _ => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Correct the highlighted fields and try again",
            ErrorCategory::Network => {
                "Check that the matching API is reachable (--api-base-url) and try again"
            }
            ErrorCategory::Remote => "Review the request data or try again later",
            ErrorCategory::Configuration => "Check the config file, environment and CLI flags",
            ErrorCategory::Session => "Go back or restart the form",
            ErrorCategory::System => "Re-run with --verbose and inspect the logs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_classification() {
        let cases = [
            (400, RemoteErrorKind::BadRequest),
            (401, RemoteErrorKind::Unauthorized),
            (403, RemoteErrorKind::Forbidden),
            (404, RemoteErrorKind::NotFound),
            (422, RemoteErrorKind::Unprocessable),
            (500, RemoteErrorKind::Server),
            (503, RemoteErrorKind::Server),
            (418, RemoteErrorKind::Other),
        ];

        for (status, expected) in cases {
            let err = CareMatchError::RemoteStatusError {
                status,
                message: "boom".to_string(),
            };
            assert_eq!(err.remote_kind(), Some(expected), "status {}", status);
            assert_eq!(err.user_friendly_message(), expected.user_message());
            assert_eq!(err.severity(), ErrorSeverity::Medium);
        }
    }

    #[test]
    fn test_validation_error_message_lists_fields() {
        let err = CareMatchError::ValidationError(ValidationErrors::single(
            "name",
            "Name must be at least 2 characters.",
        ));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.user_friendly_message(), "Name must be at least 2 characters.");
        assert!(err.remote_kind().is_none());
    }

    #[test]
    fn test_unexpected_errors_use_fallback_message() {
        let err = CareMatchError::IoError(std::io::Error::other("disk"));
        assert_eq!(err.user_friendly_message(), UNEXPECTED_ERROR_MESSAGE);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
