//! Account and password-reset record storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::token::Role;

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Numeric account ID, assigned by the store.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Unique login email.
    pub email: String,
    /// PHC-formatted password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account was promoted to admin in the store itself.
    pub is_admin: bool,
}

impl Account {
    /// Resolves the role this account receives at credential issuance.
    ///
    /// An account is an admin if the store flags it or if its name and email
    /// appear in the configured allow-list.
    #[must_use]
    pub fn role(&self, config: &AuthConfig) -> Role {
        if self.is_admin || config.is_administrator(&self.full_name, &self.email) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

/// An outstanding password-reset request.
///
/// Only a SHA-256 fingerprint of the reset credential is kept, so a leaked
/// table cannot be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetRecord {
    /// Email of the account the reset belongs to.
    pub email: String,
    /// Hex SHA-256 of the reset credential.
    pub token_hash: String,
    /// When the reset was requested.
    pub created_at: OffsetDateTime,
    /// When the reset credential expires.
    pub expires_at: OffsetDateTime,
}

impl ResetRecord {
    /// Creates a record for `token`, storing only its fingerprint.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        token: &str,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            email: email.into(),
            token_hash: Self::hash_token(token),
            created_at,
            expires_at,
        }
    }

    /// Hashes a reset credential for storage and lookup.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns `true` if the credential has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Storage for accounts and their reset records.
///
/// Emails are unique. Implementations decide how emails are normalized,
/// but must apply the same rule on insert and lookup.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates an account and returns it with its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the email is already registered.
    async fn create_account(&self, account: NewAccount) -> AuthResult<Account>;

    /// Finds an account by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>>;

    /// Replaces the password hash of an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if no account has this email.
    async fn update_password(&self, email: &str, password_hash: &str) -> AuthResult<()>;

    /// Stores a reset record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create_reset_record(&self, record: ResetRecord) -> AuthResult<()>;

    /// Finds a reset record by credential fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_reset_record(&self, token_hash: &str) -> AuthResult<Option<ResetRecord>>;

    /// Deletes a reset record by credential fingerprint. Deleting a missing
    /// record succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_reset_record(&self, token_hash: &str) -> AuthResult<()>;

    /// Stores `record` as the only reset record of its email, removing any
    /// earlier ones, and returns how many were superseded.
    ///
    /// The removal and the insert must be atomic with respect to other calls
    /// for the same email: after two concurrent calls exactly one record is
    /// left.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn replace_reset_record(&self, record: ResetRecord) -> AuthResult<u64>;

    /// Deletes every reset record of an account and returns how many were
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_reset_records_for(&self, email: &str) -> AuthResult<u64>;

    /// Deletes reset records whose credential has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired_reset_records(&self) -> AuthResult<u64>;
}
