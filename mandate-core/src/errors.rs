use std::io;

use thiserror::Error;

/// Result type used across the Mandate crates.
pub type Result<T> = std::result::Result<T, MandateError>;

/// Canonical error representation shared by the services.
#[derive(Debug, Error)]
pub enum MandateError {
    #[error("i/o error: {0}")]
    IoError(#[from] io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("catalog error: {0}")]
    CatalogError(String),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("{0}")]
    GeneralError(String),
}

impl From<serde_json::Error> for MandateError {
    fn from(err: serde_json::Error) -> Self {
        MandateError::DeserializationError(err.to_string())
    }
}

impl From<sqlx::Error> for MandateError {
    fn from(err: sqlx::Error) -> Self {
        MandateError::DatabaseError(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable is missing: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {message}")]
    InvalidEnvVar { key: &'static str, message: String },
}

impl From<ConfigError> for MandateError {
    fn from(value: ConfigError) -> Self {
        MandateError::ConfigurationError(value.to_string())
    }
}
