//! Centralized error types for the attachment downloader.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::MessageRef;

/// All errors produced by the downloader library.
///
/// The first group aborts a run. [`DownloadError::Fetch`] and
/// [`DownloadError::Write`] are per-item: the processor logs them and moves
/// on to the next message or attachment.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Bad or missing command-line input.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The server rejected the credentials for this identity.
    #[error("Authentication failed for '{identity}': {reason}")]
    Authentication { identity: String, reason: String },

    /// The selected mailbox does not exist on the server.
    #[error("Mailbox not found: '{mailbox}' ({reason})")]
    MailboxNotFound { mailbox: String, reason: String },

    /// The destination folder could not be created or is not a directory.
    #[error("Cannot use destination folder '{path}': {source}")]
    Destination {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Transport-level failure talking to the mail server.
    #[error("Connection error: {0}")]
    Connection(String),

    /// No credential could be obtained for the identity.
    #[error("Could not obtain a password for '{identity}': {reason}")]
    Credential { identity: String, reason: String },

    /// A single message could not be fetched or parsed.
    #[error("Failed to fetch message {message}: {reason}")]
    Fetch { message: MessageRef, reason: String },

    /// A single attachment could not be written.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, DownloadError>`.
pub type Result<T> = std::result::Result<T, DownloadError>;

impl DownloadError {
    /// Create a `Destination` variant from a path and an `io::Error`.
    pub fn destination(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Destination {
            path: path.into(),
            source,
        }
    }

    /// Create a `Write` variant from a path and an `io::Error`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a `Fetch` variant for a message.
    pub fn fetch(message: MessageRef, reason: impl Into<String>) -> Self {
        Self::Fetch {
            message,
            reason: reason.into(),
        }
    }
}
