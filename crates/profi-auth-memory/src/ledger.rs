//! In-memory revocation ledger.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use profi_auth::{AuthResult, Clock, RevocationLedger, SystemClock};
use time::OffsetDateTime;

/// Revoked credential IDs kept in a concurrent map.
///
/// Entries are only visible to the current process.
pub struct MemoryRevocationLedger {
    revoked: DashMap<String, OffsetDateTime>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryRevocationLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRevocationLedger {
    /// Creates an empty ledger using wall-clock time for cleanup.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty ledger that expires entries against `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            revoked: DashMap::new(),
            clock,
        }
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    /// Returns `true` if nothing has been revoked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

#[async_trait]
impl RevocationLedger for MemoryRevocationLedger {
    async fn revoke(&self, jti: &str, expires_at: OffsetDateTime) -> AuthResult<()> {
        self.revoked.entry(jti.to_string()).or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AuthResult<bool> {
        Ok(self.revoked.contains_key(jti))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at >= now);
        let removed = before.saturating_sub(self.revoked.len()) as u64;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired revocations");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profi_auth::ManualClock;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let ledger = MemoryRevocationLedger::new();
        let expires_at = datetime!(2030-01-01 00:00 UTC);

        ledger.revoke("jti-1", expires_at).await.unwrap();
        ledger.revoke("jti-1", expires_at).await.unwrap();

        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_revoked("jti-1").await.unwrap());
        assert!(!ledger.is_revoked("jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let clock = Arc::new(ManualClock::new(datetime!(2024-03-01 10:00 UTC)));
        let ledger = MemoryRevocationLedger::with_clock(clock.clone());

        ledger
            .revoke("old", datetime!(2024-03-01 09:00 UTC))
            .await
            .unwrap();
        ledger
            .revoke("live", datetime!(2024-03-15 10:00 UTC))
            .await
            .unwrap();

        assert_eq!(ledger.cleanup_expired().await.unwrap(), 1);
        assert!(!ledger.is_revoked("old").await.unwrap());
        assert!(ledger.is_revoked("live").await.unwrap());

        clock.set(datetime!(2024-03-15 10:00 UTC));
        assert_eq!(ledger.cleanup_expired().await.unwrap(), 0);
        assert!(ledger.is_revoked("live").await.unwrap());

        clock.set(datetime!(2024-03-16 00:00 UTC));
        assert_eq!(ledger.cleanup_expired().await.unwrap(), 1);
        assert!(ledger.is_empty());
    }
}
