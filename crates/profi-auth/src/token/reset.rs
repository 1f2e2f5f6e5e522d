//! Password-reset credentials.
//!
//! A reset credential is an HS256 token with a 15-minute lifetime and no
//! credential ID, so it can never act as a session. The plaintext only
//! exists in the email; the store keeps a SHA-256 fingerprint, and the
//! record is deleted once the password has been changed.

use std::sync::Arc;

use crate::config::{AuthConfig, RESET_TOKEN_LIFETIME};
use crate::mail::{EmailSender, OutgoingEmail};
use crate::password::PasswordHasher;
use crate::storage::{AccountStore, ResetRecord, bounded};
use crate::{AuthError, AuthResult};

use super::codec::CredentialCodec;

/// Issues and consumes password-reset credentials.
pub struct ResetTokenService {
    codec: Arc<CredentialCodec>,
    accounts: Arc<dyn AccountStore>,
    mailer: Arc<dyn EmailSender>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl ResetTokenService {
    /// Creates a new reset service.
    #[must_use]
    pub fn new(
        codec: Arc<CredentialCodec>,
        accounts: Arc<dyn AccountStore>,
        mailer: Arc<dyn EmailSender>,
        hasher: PasswordHasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            codec,
            accounts,
            mailer,
            hasher,
            config,
        }
    }

    /// Emails a fresh reset credential to the account registered under
    /// `email`.
    ///
    /// The new record atomically replaces any outstanding ones of the
    /// account, so only the newest credential can be consumed.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` if no account has this email
    /// - `AuthError::Delivery` if the email could not be sent
    /// - storage and timeout errors from the collaborators
    pub async fn request_reset(&self, email: &str) -> AuthResult<()> {
        let timeout = self.config.store_timeout;

        let account = bounded(timeout, "account lookup", self.accounts.find_by_email(email))
            .await?
            .ok_or_else(|| AuthError::not_found("User not registered"))?;

        let now = self.codec.clock().now();
        let role = account.role(&self.config);
        let claims = self
            .codec
            .claims(account.id, role)
            .issued_at(now)
            .lifetime(RESET_TOKEN_LIFETIME)
            .without_id()
            .build();
        let token = self.codec.encode(&claims)?;

        let record = ResetRecord::new(&account.email, &token, now, now + RESET_TOKEN_LIFETIME);
        let superseded = bounded(
            timeout,
            "reset record replace",
            self.accounts.replace_reset_record(record),
        )
        .await?;
        if superseded > 0 {
            tracing::debug!(
                user_id = account.id,
                superseded,
                "Superseded outstanding reset requests"
            );
        }

        let message = OutgoingEmail::password_reset(&account.email, &token);
        bounded(timeout, "reset email", self.mailer.send_email(&message)).await?;

        tracing::info!(user_id = account.id, "Password reset requested");
        Ok(())
    }

    /// Sets a new password using a reset credential.
    ///
    /// The credential must have a stored record and still decode. The
    /// record is deleted after the password is updated.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` if no record exists for the credential
    /// - `AuthError::InvalidCredential` if the credential fails decoding
    /// - hashing, storage and timeout errors
    pub async fn consume_reset(&self, token: &str, new_password: &str) -> AuthResult<()> {
        let timeout = self.config.store_timeout;
        let token_hash = ResetRecord::hash_token(token);

        let record = bounded(
            timeout,
            "reset record lookup",
            self.accounts.find_reset_record(&token_hash),
        )
        .await?
        .ok_or_else(|| AuthError::not_found("User with provided token not found"))?;

        let claims = self.codec.decode(token).map_err(|err| {
            tracing::debug!(error = %err, "Reset credential rejected");
            AuthError::from(err)
        })?;

        let password_hash = self.hasher.hash_password_blocking(new_password).await?;
        bounded(
            timeout,
            "password update",
            self.accounts.update_password(&record.email, &password_hash),
        )
        .await?;

        bounded(
            timeout,
            "reset record delete",
            self.accounts.delete_reset_record(&token_hash),
        )
        .await?;

        tracing::info!(user_id = claims.user_id, "Password reset completed");
        Ok(())
    }
}
