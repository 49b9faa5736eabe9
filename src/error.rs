//! Error handling for curlkit

use thiserror::Error;

/// Main error type for curlkit operations
#[derive(Error, Debug)]
pub enum CurlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for curlkit operations
pub type Result<T> = std::result::Result<T, CurlError>;
