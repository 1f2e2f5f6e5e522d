//! Errors raised while configuring the mailer or delivering a message.

use profi_auth::AuthError;
use thiserror::Error;

/// Mail delivery errors.
///
/// Converted into [`AuthError`] at the [`profi_auth::EmailSender`] boundary:
/// configuration problems become `AuthError::Configuration`, everything else
/// `AuthError::Delivery`.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The `[mail]` settings are incomplete or rejected by the transport.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sender or recipient address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The MIME message could not be assembled.
    #[error("Failed to build message: {0}")]
    Build(String),

    /// The relay refused the message or could not be reached.
    #[error("Send failed: {0}")]
    SendFailed(String),
}

impl From<NotificationError> for AuthError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::InvalidConfig(message) => AuthError::configuration(message),
            other => AuthError::delivery(other.to_string()),
        }
    }
}
