//! Mailbox error types.

use thiserror::Error;

use crate::error::StorageError;

/// Errors that can occur while talking to the mailbox.
#[derive(Error, Debug)]
pub enum EmailError {
    /// Failed to connect to the IMAP server.
    #[error("IMAP connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS/SSL error during connection.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to resolve the app password.
    #[error("Credentials not found: {0}")]
    CredentialsNotFound(String),

    /// A folder could not be listed or opened.
    #[error("Cannot access folder '{folder}': {reason}")]
    FolderAccess { folder: String, reason: String },

    /// UID search failed.
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// Fetching messages or a body section failed.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// The server returned no bytes for an attachment section.
    #[error("Attachment section {section} of message {uid} is empty")]
    EmptyAttachment { uid: u32, section: String },

    /// Writing an attachment failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// IO error on the connection.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EmailError {
    /// Errors that end the whole run. Everything else is logged and the
    /// scan moves on to the next message or folder.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EmailError::ConnectionFailed(_)
                | EmailError::TlsError(_)
                | EmailError::AuthenticationFailed(_)
                | EmailError::CredentialsNotFound(_)
                | EmailError::ConfigError(_)
        )
    }
}

impl From<async_native_tls::Error> for EmailError {
    fn from(err: async_native_tls::Error) -> Self {
        EmailError::TlsError(err.to_string())
    }
}

impl From<crate::secrets::SecretError> for EmailError {
    fn from(err: crate::secrets::SecretError) -> Self {
        EmailError::CredentialsNotFound(err.to_string())
    }
}

/// Result type for email operations.
pub type Result<T> = std::result::Result<T, EmailError>;
