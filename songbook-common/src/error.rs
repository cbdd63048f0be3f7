//! Common error types for songbook

use thiserror::Error;

/// Common result type for songbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers.
///
/// Conditions that are recovered internally (a missing playlist file on load,
/// an undecodable playlist line, a numeric tag that fails to parse, a member
/// on an unmounted volume) never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected name, directory, tag key or tag value
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or parsing error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backing medium could not be re-read
    #[error("Load error: {0}")]
    Load(String),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`]
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}
