use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Geocoding request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed input: {message}")]
    InputFormatError { message: String },

    #[error("{count} row(s) failed validation; output was not written")]
    RejectedRowsError { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Validation,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CsvError(_) | EtlError::InputFormatError { .. } => ErrorCategory::Input,
            EtlError::IoError(_) => ErrorCategory::Input,
            EtlError::SerializationError(_) => ErrorCategory::Output,
            EtlError::TomlError(_)
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::RejectedRowsError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Validation | ErrorCategory::Output => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Whether a failed geocoding call is worth another attempt.
    ///
    /// Transport and HTTP status failures are; a response body that does not
    /// decode is not, and neither is anything raised outside the HTTP client.
    pub fn is_transient(&self) -> bool {
        match self {
            EtlError::ApiError(e) => !e.is_decode() && !e.is_builder(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "Check network connectivity and the geocoding service status",
            EtlError::CsvError(_) => "Make sure the input is a comma-separated file with a header row",
            EtlError::IoError(_) => "Make sure the input file exists and is readable",
            EtlError::SerializationError(_) | EtlError::InputFormatError { .. } => {
                "Make sure the input is a JSON array of contractor objects"
            }
            EtlError::TomlError(_) => "Check the syntax of the --config file",
            EtlError::MissingConfigError { .. } => {
                "Set it with: export OPENCAGE_API_KEY='your_key_here'"
            }
            EtlError::InvalidConfigValueError { .. } => "Fix the reported value and run again",
            EtlError::RejectedRowsError { .. } => "Fix the reported rows and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Input file not found ({})", e)
            }
            EtlError::MissingConfigError { field } => {
                format!("ERROR: {} environment variable not set", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
