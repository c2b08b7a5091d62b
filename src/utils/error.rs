use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Vehicle service responded with status {status}")]
    UpstreamStatusError { status: u16 },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid board command '{input}': {reason}")]
    InvalidCommandError { input: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BoardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BoardError::ApiError(_) | BoardError::UpstreamStatusError { .. } => {
                ErrorCategory::Network
            }
            BoardError::ConfigError { .. }
            | BoardError::ConfigValidationError { .. }
            | BoardError::InvalidConfigValueError { .. }
            | BoardError::MissingConfigError { .. } => ErrorCategory::Configuration,
            BoardError::InvalidCommandError { .. } | BoardError::SerializationError(_) => {
                ErrorCategory::Input
            }
            BoardError::ZipError(_)
            | BoardError::CsvError(_)
            | BoardError::IoError(_)
            | BoardError::ProcessingError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BoardError::ApiError(_) => {
                "Check network connectivity and that the vehicle endpoint is reachable".to_string()
            }
            BoardError::UpstreamStatusError { status } => format!(
                "The vehicle service returned HTTP {}; verify the endpoint URL or try again later",
                status
            ),
            BoardError::ConfigError { .. } | BoardError::ConfigValidationError { .. } => {
                "Review the configuration file syntax and values".to_string()
            }
            BoardError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            BoardError::MissingConfigError { field } => {
                format!("Add the '{}' setting to the configuration", field)
            }
            BoardError::InvalidCommandError { .. } => {
                "Use sort:<year|price>, edit:<id>:<field>=<value>[,...] or delete:<id>".to_string()
            }
            BoardError::SerializationError(_) => {
                "The vehicle data could not be encoded or decoded as JSON".to_string()
            }
            BoardError::ProcessingError { .. } => {
                "Inspect the fetched vehicle data for unexpected values".to_string()
            }
            BoardError::ZipError(_) | BoardError::CsvError(_) | BoardError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not load vehicles: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Output => format!("Could not write output: {}", self),
        }
    }

    /// 依嚴重程度決定程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_errors_are_high_severity_input() {
        let err = BoardError::InvalidCommandError {
            input: "spin:year".to_string(),
            reason: "unknown action".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("spin:year"));
    }

    #[test]
    fn test_upstream_status_is_retryable() {
        let err = BoardError::UpstreamStatusError { status: 503 };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.exit_code(), 2);
        assert!(err.recovery_suggestion().contains("503"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = BoardError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
