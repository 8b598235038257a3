//! Error types for faas-loader-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::trace::TraceError;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Trace generation rejected its inputs
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),

    /// A builder was finalised without a required part
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Dispatch error
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Dispatch failure with a message
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch(message.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
