//! Error types for the tagbatch interrogation pipeline.
//!
//! Errors are organized by concern. None of them is fatal to a batch step:
//! the orchestrator logs backend and settings failures and carries on, so
//! these types mostly surface at the configuration and CLI boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for tagbatch operations.
#[derive(Error, Debug)]
pub enum TagBatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tagging backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Persisted settings errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while talking to a tagging backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The optional backend is not installed or not enabled on the host
    #[error("Backend '{0}' is not available")]
    Missing(String),

    /// A sub-model display name could not be mapped to a backend key
    #[error("No internal key found for model '{display_name}' on {backend}")]
    UnresolvedModel {
        backend: String,
        display_name: String,
    },

    /// The backend failed during inference
    #[error("{backend} failed for model '{model}': {message}")]
    Invocation {
        backend: String,
        model: String,
        message: String,
    },

    /// HTTP transport or status failure
    #[error("HTTP error from {url}: {message}")]
    Http {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The image could not be encoded for transport
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Errors reading or writing the persisted settings files.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Reading a settings file failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing a settings file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The find/replace file does not have the two-line layout
    #[error("Invalid custom replace file format: {0}")]
    Format(PathBuf),
}

/// Convenience type alias for tagbatch results.
pub type Result<T> = std::result::Result<T, TagBatchError>;

/// Convenience type alias for backend results.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
