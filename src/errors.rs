/*!
 * Error types for the vocabkit jobs.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Jobs and the binary wrap these in `anyhow` with context.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading a dataset for segmentation
#[derive(Error, Debug)]
pub enum SegmentError {
    /// The source text file does not exist
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The source exists but could not be read as UTF-8 text
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when talking to a document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A path did not have the expected collection/document shape
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A write batch would grow past the backend's limit
    #[error("Write batch limit exceeded: at most {limit} writes per batch")]
    BatchLimitExceeded {
        /// Maximum writes allowed in one batch
        limit: usize,
    },

    /// Error from the local SQLite backend
    #[error("Database error: {0}")]
    Database(String),

    /// Error establishing or maintaining a connection to a remote store
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error returned by a remote store API
    #[error("Store responded with error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error with authentication against a remote store
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A document body could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        Self::Connection(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from segmenting a dataset
    #[error("Segment error: {0}")]
    Segment(#[from] SegmentError),

    /// Error from the document store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
