use thiserror::Error;

/// Core error types for Coursehub operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid course status: {0}")]
    InvalidStatus(String),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),
}

impl CoreError {
    /// Create a new InvalidStatus error
    pub fn invalid_status(status: impl Into<String>) -> Self {
        Self::InvalidStatus(status.into())
    }

    /// Create a new InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatus(_) | Self::InvalidInput { .. } | Self::JsonError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidStatus(_) | Self::InvalidInput { .. } => ErrorCategory::Validation,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::UuidError(_) => ErrorCategory::System,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
    System,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::invalid_status("LIVE");
        assert_eq!(err.to_string(), "Invalid course status: LIVE");
        assert!(err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_invalid_input_error() {
        let err = CoreError::invalid_input("title must not be empty");
        assert_eq!(err.to_string(), "Invalid input: title must not be empty");
        assert!(err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let core_err: CoreError = json_err.into();

        assert!(matches!(core_err, CoreError::JsonError(_)));
        assert!(core_err.is_client_error());
        assert_eq!(core_err.category(), ErrorCategory::Serialization);
    }

    #[test]
    fn test_uuid_error_conversion() {
        let uuid_err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let core_err: CoreError = uuid_err.into();

        assert!(matches!(core_err, CoreError::UuidError(_)));
        assert!(!core_err.is_client_error());
        assert_eq!(core_err.category(), ErrorCategory::System);
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Serialization.to_string(), "serialization");
        assert_eq!(ErrorCategory::System.to_string(), "system");
    }
}
