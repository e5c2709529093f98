// ABOUTME: Error types for the course-slides application
// ABOUTME: Provides structured error handling for metadata, rendering and serving

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Server error: {0}")]
    ServeError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl SiteError {
    /// HTTP status code a live response should carry for this error
    pub fn status(&self) -> u16 {
        match self {
            SiteError::Forbidden(_) => 403,
            SiteError::NotFound(_) | SiteError::PathNotFoundError(_) => 404,
            _ => 500,
        }
    }
}

// Tera nests the useful message (missing variable, parse location) in the source chain
impl From<tera::Error> for SiteError {
    fn from(err: tera::Error) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        SiteError::RenderError(message)
    }
}

// Implement conversion from anyhow::Error to our SiteError
impl From<anyhow::Error> for SiteError {
    fn from(err: anyhow::Error) -> Self {
        SiteError::UnknownError(err.to_string())
    }
}

impl From<walkdir::Error> for SiteError {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(io) => SiteError::FileReadError(io),
            None => SiteError::ValidationError("Filesystem loop detected while copying".to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
