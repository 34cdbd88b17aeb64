//! Error types for the sanction-notice library.
//!
//! The extraction engine itself never fails; these errors only arise at the
//! I/O seam (reading files, decoding text sources, building thread pools).

use std::io;
use thiserror::Error;

/// Result type alias for sanction-notice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sanction-notice library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Text encoding error.
    #[error("Text encoding error: {0}")]
    Encoding(String),

    /// A text source reported the document as unusable.
    #[error("Text source failure: {0}")]
    SourceFailure(String),

    /// The worker pool for batch extraction could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(err.to_string())
    }
}
