//! Storage traits for accounts, reset records and revoked sessions.
//!
//! # Implementations
//!
//! - `profi-auth-memory` - in-process backend

use std::future::Future;
use std::time::Duration;

use crate::{AuthError, AuthResult};

pub mod account;
pub mod revoked_token;

pub use account::{Account, AccountStore, NewAccount, ResetRecord};
pub use revoked_token::RevocationLedger;

/// Runs a collaborator call, failing with `AuthError::Timeout` if it does
/// not finish within `limit`.
pub(crate) async fn bounded<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Collaborator call timed out"
            );
            Err(AuthError::timeout(operation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let ok = bounded(Duration::from_secs(1), "lookup", async { Ok::<_, AuthError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = bounded(Duration::from_secs(1), "lookup", async {
            Err::<(), _>(AuthError::storage("down"))
        })
        .await;
        assert!(matches!(err, Err(AuthError::Storage { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result = bounded(Duration::from_millis(50), "revocation lookup", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, AuthError>(())
        })
        .await;

        match result {
            Err(AuthError::Timeout { operation }) => assert_eq!(operation, "revocation lookup"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
