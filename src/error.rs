use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(tavolo::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(tavolo::config))]
    Config(String),

    #[error("Datastore error: {0}")]
    #[diagnostic(code(tavolo::datastore))]
    Datastore(String),

    #[error("{0} not found")]
    #[diagnostic(code(tavolo::not_found))]
    NotFound(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(code(tavolo::auth))]
    Auth(String),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(tavolo::invalid_input))]
    InvalidInput(String),

    #[error(transparent)]
    #[diagnostic(code(tavolo::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(tavolo::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(tavolo::other))]
    Other(String),
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create datastore errors
pub fn datastore_error(message: &str) -> Error {
    Error::Datastore(message.to_string())
}

/// Helper to create not-found errors
pub fn not_found(entity: &str) -> Error {
    Error::NotFound(entity.to_string())
}

/// Helper to create invalid-input errors
pub fn invalid_input(message: &str) -> Error {
    Error::InvalidInput(message.to_string())
}
