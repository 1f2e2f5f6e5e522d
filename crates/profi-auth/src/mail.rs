//! Outgoing email seam.
//!
//! The subsystem only composes messages; delivery belongs to an
//! [`EmailSender`] such as `profi_notifications::SmtpMailer`.

use async_trait::async_trait;

use crate::AuthResult;

/// Subject line of the password-reset email.
pub const RESET_EMAIL_SUBJECT: &str = "FitProfi: reset password";

/// A fully composed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// MIME type of `body`, e.g. `text/html`.
    pub content_type: String,
    /// Message body.
    pub body: String,
}

impl OutgoingEmail {
    /// Composes the password-reset email carrying `token`.
    #[must_use]
    pub fn password_reset(to: impl Into<String>, token: &str) -> Self {
        Self {
            to: to.into(),
            subject: RESET_EMAIL_SUBJECT.to_string(),
            content_type: "text/html".to_string(),
            body: format!(
                "<h2>{RESET_EMAIL_SUBJECT}</h2>\
                 <p>Hello!</p>\
                 <p>To reset your password, use this token:</p>\
                 <p><b>{token}</b></p>"
            ),
        }
    }
}

/// Delivers composed emails.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends one email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Delivery` if the transport rejects the message.
    async fn send_email(&self, email: &OutgoingEmail) -> AuthResult<()>;
}
