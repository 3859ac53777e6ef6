use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Listing source '{source_name}' failed: {message}")]
    FetchError {
        source_name: String,
        message: String,
    },

    #[error("Computation error: {message}")]
    ComputationError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Computation,
    Configuration,
    System,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StatsError {
    pub fn fetch(source_name: &str, err: impl std::fmt::Display) -> Self {
        StatsError::FetchError {
            source_name: source_name.to_string(),
            message: err.to_string(),
        }
    }

    pub fn computation(message: impl Into<String>) -> Self {
        StatsError::ComputationError {
            message: message.into(),
        }
    }

    pub fn is_fetch_error(&self) -> bool {
        matches!(self, StatsError::FetchError { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StatsError::FetchError { .. } => ErrorCategory::Source,
            StatsError::ComputationError { .. } => ErrorCategory::Computation,
            StatsError::ConfigError { .. }
            | StatsError::ConfigValidationError { .. }
            | StatsError::InvalidConfigValueError { .. }
            | StatsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            StatsError::IoError(_) | StatsError::SerializationError(_) => ErrorCategory::System,
            StatsError::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Source => ErrorSeverity::Medium,
            ErrorCategory::Computation | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StatsError::FetchError { .. } => {
                "Check that the listing source is reachable and returns valid listings, then retry"
            }
            StatsError::ComputationError { .. } => {
                "Check the region parameters (latitude, longitude, radius)"
            }
            StatsError::IoError(_) => "Check file paths and permissions",
            StatsError::SerializationError(_) => "Check that the input or cached JSON is well formed",
            StatsError::ConfigError { .. }
            | StatsError::ConfigValidationError { .. }
            | StatsError::InvalidConfigValueError { .. }
            | StatsError::MissingConfigError { .. } => {
                "Review the configuration file against the documented sections"
            }
            StatsError::ValidationError { .. } => "Correct the request parameters and try again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StatsError::FetchError { source_name, .. } => {
                format!("Could not load listings from '{}'", source_name)
            }
            StatsError::ComputationError { message } => {
                format!("Statistics could not be computed: {}", message)
            }
            StatsError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value for '{}' is invalid: {}", field, reason)
            }
            StatsError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
