//! Revocation ledger trait.
//!
//! A revoked session is remembered by its credential ID (`jti`) until the
//! last moment the codec would still accept it, `exp + leeway`. After that
//! the entry can be discarded: the codec rejects the credential on its own.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;

/// Persistent set of revoked credential IDs.
///
/// Must be shared by every process that verifies sessions; a revocation
/// recorded by one process has to be visible to all of them.
///
/// # Implementations
///
/// - `profi-auth-memory` - in-process ledger for tests and single-node use
#[async_trait]
pub trait RevocationLedger: Send + Sync {
    /// Records `jti` as revoked until `expires_at`.
    ///
    /// Idempotent: revoking an already revoked ID succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, jti: &str, expires_at: OffsetDateTime) -> AuthResult<()>;

    /// Returns `true` if `jti` has been revoked.
    ///
    /// Called on every session verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn is_revoked(&self, jti: &str) -> AuthResult<bool>;

    /// Deletes entries whose `expires_at` is strictly in the past and
    /// returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
