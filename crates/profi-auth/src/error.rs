//! Error types for the access-credential subsystem.
//!
//! Every fallible operation in this crate returns [`AuthError`]. Callers that
//! need to branch on the failure class match on [`AuthError::kind`] instead of
//! inspecting messages.

use std::fmt;

use crate::token::CodecError;

/// Errors that can occur while issuing, verifying or consuming credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential could not be signed or serialized.
    #[error("Failed to encode credential: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },

    /// The credential is malformed, forged, expired, not yet valid or revoked.
    ///
    /// The cause is deliberately not part of the message so that callers
    /// cannot be used as an oracle.
    #[error("Invalid credential")]
    InvalidCredential,

    /// The requested account or reset record does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up.
        message: String,
    },

    /// An account with the same identity already exists.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting record.
        message: String,
    },

    /// The supplied password does not match the stored hash.
    #[error("Wrong password")]
    InvalidPassword,

    /// The email collaborator failed to deliver a message.
    #[error("Delivery failed: {message}")]
    Delivery {
        /// Transport error description.
        message: String,
    },

    /// The authenticated identity is not allowed to perform the action.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// Hashing or parsing a password hash failed.
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Description of the hashing error.
        message: String,
    },

    /// The backing store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// A collaborator call did not finish within the configured bound.
    #[error("Timed out: {operation}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
    },

    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `Delivery` error.
    #[must_use]
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `PasswordHash` error.
    #[must_use]
    pub fn password_hash(message: impl Into<String>) -> Self {
        Self::PasswordHash {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the tagged kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InvalidPassword => ErrorKind::InvalidPassword,
            Self::Delivery { .. } => ErrorKind::Delivery,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::PasswordHash { .. } => ErrorKind::Internal,
            Self::Storage { .. } | Self::Timeout { .. } => ErrorKind::Infrastructure,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the caller should be told "unauthorized".
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::InvalidCredential)
    }

    /// Returns `true` if this error was caused by the request rather than the system.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidCredential
                | ErrorKind::NotFound
                | ErrorKind::Conflict
                | ErrorKind::InvalidPassword
                | ErrorKind::Forbidden
        )
    }

    /// Returns `true` if a caller may reasonably retry the operation later.
    ///
    /// The subsystem never retries on its own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Timeout { .. } | Self::Delivery { .. }
        )
    }
}

impl From<CodecError> for AuthError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encoding { message } => Self::Encoding { message },
            _ => Self::InvalidCredential,
        }
    }
}

/// Tagged classification of [`AuthError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential signing or serialization failed.
    Encoding,
    /// Credential rejected; surfaced as "unauthorized".
    InvalidCredential,
    /// Unknown account, email or reset record.
    NotFound,
    /// Duplicate account.
    Conflict,
    /// Password mismatch at login.
    InvalidPassword,
    /// Email transport failure.
    Delivery,
    /// Role or ownership mismatch.
    Forbidden,
    /// Store failure or timeout.
    Infrastructure,
    /// Invalid configuration.
    Configuration,
    /// Anything else.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding => write!(f, "encoding"),
            Self::InvalidCredential => write!(f, "invalid_credential"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::InvalidPassword => write!(f, "invalid_password"),
            Self::Delivery => write!(f, "delivery"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
