//! Account facade: registration, login, logout and password recovery.
//!
//! # Usage
//!
//! ```ignore
//! use profi_auth::{AccountService, AuthConfig, SystemClock};
//!
//! let config = AuthConfig::new("fit-profi-api", secret);
//! let service = AccountService::new(&config, accounts, ledger, mailer, Arc::new(SystemClock))?;
//!
//! let session = service.login("ann@example.com", "s3cret").await?;
//! let identity = service.verify(&session.token).await;
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::mail::EmailSender;
use crate::password::PasswordHasher;
use crate::storage::{Account, AccountStore, NewAccount, RevocationLedger, bounded};
use crate::token::{
    CredentialCodec, ResetTokenService, Role, SessionIdentity, SessionTokenService,
};
use crate::{AuthError, AuthResult};

/// Result of a successful registration or login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Session credential.
    pub token: String,
    /// Account ID.
    pub user_id: i64,
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Role carried by `token`.
    pub role: Role,
}

/// Entry point for every credential-gated account flow.
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    sessions: SessionTokenService,
    resets: ResetTokenService,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl AccountService {
    /// Validates `config` and wires up the session and reset services.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the configuration is invalid.
    pub fn new(
        config: &AuthConfig,
        accounts: Arc<dyn AccountStore>,
        ledger: Arc<dyn RevocationLedger>,
        mailer: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        config
            .validate()
            .map_err(|e| AuthError::configuration(e.to_string()))?;

        let config = Arc::new(config.clone());
        let codec = Arc::new(CredentialCodec::from_config(&config, clock));
        let hasher = PasswordHasher::new(&config.password)?;

        Ok(Self {
            sessions: SessionTokenService::new(codec.clone(), ledger, &config),
            resets: ResetTokenService::new(
                codec,
                accounts.clone(),
                mailer,
                hasher.clone(),
                config.clone(),
            ),
            accounts,
            hasher,
            config,
        })
    }

    /// Returns the session service.
    #[must_use]
    pub fn sessions(&self) -> &SessionTokenService {
        &self.sessions
    }

    /// Returns the reset service.
    #[must_use]
    pub fn resets(&self) -> &ResetTokenService {
        &self.resets
    }

    /// Creates an account and opens a session for it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the email is already registered.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthSession> {
        let password_hash = self.hasher.hash_password_blocking(password).await?;
        let account = bounded(
            self.config.store_timeout,
            "account insert",
            self.accounts.create_account(NewAccount {
                full_name: full_name.to_string(),
                email: email.to_string(),
                password_hash,
            }),
        )
        .await?;

        tracing::info!(user_id = account.id, "Account registered");
        self.open_session(account)
    }

    /// Checks credentials and opens a session.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` if no account has this email
    /// - `AuthError::InvalidPassword` if the password does not match
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let account = bounded(
            self.config.store_timeout,
            "account lookup",
            self.accounts.find_by_email(email),
        )
        .await?
        .ok_or_else(|| AuthError::not_found("User not registered"))?;

        if !self
            .hasher
            .verify_password_blocking(password, &account.password_hash)
            .await?
        {
            tracing::debug!(user_id = account.id, "Login with wrong password");
            return Err(AuthError::InvalidPassword);
        }

        self.open_session(account)
    }

    /// Revokes a session. Invalid credentials are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger write fails.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        self.sessions.revoke_session(token).await
    }

    /// Verifies a session credential.
    pub async fn verify(&self, token: &str) -> Option<SessionIdentity> {
        self.sessions.verify_session(token).await
    }

    /// Emails a password-reset credential.
    ///
    /// # Errors
    ///
    /// See [`ResetTokenService::request_reset`].
    pub async fn request_password_reset(&self, email: &str) -> AuthResult<()> {
        self.resets.request_reset(email).await
    }

    /// Sets a new password using a reset credential.
    ///
    /// # Errors
    ///
    /// See [`ResetTokenService::consume_reset`].
    pub async fn reset_password(&self, token: &str, password: &str) -> AuthResult<()> {
        self.resets.consume_reset(token, password).await
    }

    fn open_session(&self, account: Account) -> AuthResult<AuthSession> {
        let role = account.role(&self.config);
        let token = self.sessions.issue_session(account.id, role)?;
        Ok(AuthSession {
            token,
            user_id: account.id,
            full_name: account.full_name,
            email: account.email,
            role,
        })
    }
}
