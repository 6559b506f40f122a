use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Authentication error: {0}")]
    #[diagnostic(code(bookedcal::auth))]
    Auth(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(bookedcal::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(bookedcal::config))]
    Config(String),

    #[error("Extraction error: {0}")]
    #[diagnostic(code(bookedcal::extraction))]
    Extraction(String),

    #[error("Incomplete event fields, missing: {0}")]
    #[diagnostic(code(bookedcal::incomplete_fields))]
    IncompleteFields(String),

    #[error("Invalid date/time: {0}")]
    #[diagnostic(code(bookedcal::invalid_datetime))]
    InvalidDateTime(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(bookedcal::google_calendar))]
    GoogleCalendar(String),

    #[error(transparent)]
    #[diagnostic(code(bookedcal::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(bookedcal::serialization))]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create extraction errors
pub fn extraction_error(message: &str) -> Error {
    Error::Extraction(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}
