//! Error types for the scheduler.

use thiserror::Error;

/// Errors that can occur while fetching, importing or exporting schedules.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A request failed or the server answered with a non-2xx status.
    #[error("Network error: {0}")]
    Network(String),

    /// A single lecture record could not be normalized.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("No events found")]
    NoEventsFound,

    #[error("No valid configurations to fetch")]
    NoValidConfigurations,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Not logged in. Run `thws-scheduler login` first")]
    NotAuthenticated,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ScheduleError {
    /// Whether retrying the same operation later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScheduleError::Network(_))
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ScheduleError {
    fn from(err: toml::de::Error) -> Self {
        ScheduleError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for ScheduleError {
    fn from(err: toml::ser::Error) -> Self {
        ScheduleError::Serialization(err.to_string())
    }
}

impl From<::config::ConfigError> for ScheduleError {
    fn from(err: ::config::ConfigError) -> Self {
        ScheduleError::Config(err.to_string())
    }
}

/// Result type alias for scheduler operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
