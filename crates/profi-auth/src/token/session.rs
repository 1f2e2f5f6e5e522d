//! Session credentials: issuance, verification and revocation.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AuthConfig, SESSION_LIFETIME};
use crate::storage::{RevocationLedger, bounded};
use crate::{AuthError, AuthResult};

use super::claims::Role;
use super::codec::CredentialCodec;

/// Identity extracted from a verified session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Account ID.
    pub user_id: i64,
    /// Role resolved at issuance.
    pub role: Role,
}

impl SessionIdentity {
    /// Returns `true` if the session carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fails unless the session carries the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` for non-admin sessions.
    pub fn require_admin(&self) -> AuthResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::forbidden("admin role required"))
        }
    }

    /// Fails unless the session belongs to `owner_id` or carries the admin
    /// role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn require_owner_or_admin(&self, owner_id: i64) -> AuthResult<()> {
        if self.user_id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::forbidden("not the owner of this resource"))
        }
    }
}

/// Issues, verifies and revokes session credentials.
pub struct SessionTokenService {
    codec: Arc<CredentialCodec>,
    ledger: Arc<dyn RevocationLedger>,
    store_timeout: Duration,
}

impl SessionTokenService {
    /// Creates a new session service.
    #[must_use]
    pub fn new(
        codec: Arc<CredentialCodec>,
        ledger: Arc<dyn RevocationLedger>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            codec,
            ledger,
            store_timeout: config.store_timeout,
        }
    }

    /// Issues a 14-day session credential with a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encoding` if signing fails.
    pub fn issue_session(&self, user_id: i64, role: Role) -> AuthResult<String> {
        let claims = self
            .codec
            .claims(user_id, role)
            .lifetime(SESSION_LIFETIME)
            .build();

        let token = self.codec.encode(&claims)?;
        tracing::debug!(user_id, role = %role, "Session issued");
        Ok(token)
    }

    /// Verifies a session credential.
    ///
    /// Returns `None` if the credential fails decoding, carries no ID, has
    /// been revoked, or if the revocation ledger cannot be consulted.
    pub async fn verify_session(&self, token: &str) -> Option<SessionIdentity> {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(error = %err, "Session credential rejected");
                return None;
            }
        };

        let Some(jti) = claims.jti.as_deref() else {
            tracing::debug!(user_id = claims.user_id, "Credential without ID used as session");
            return None;
        };

        match bounded(
            self.store_timeout,
            "revocation lookup",
            self.ledger.is_revoked(jti),
        )
        .await
        {
            Ok(false) => Some(SessionIdentity {
                user_id: claims.user_id,
                role: claims.user_role,
            }),
            Ok(true) => {
                tracing::debug!(user_id = claims.user_id, "Revoked session presented");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "Revocation lookup failed, rejecting session");
                None
            }
        }
    }

    /// Revokes a session credential for as long as it could still decode,
    /// that is until `exp + leeway`.
    ///
    /// Credentials that fail decoding (including already expired ones) or
    /// that carry no ID are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger write fails or times out.
    pub async fn revoke_session(&self, token: &str) -> AuthResult<()> {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring revocation of invalid credential");
                return Ok(());
            }
        };

        let Some(jti) = claims.jti.as_deref() else {
            return Ok(());
        };

        bounded(
            self.store_timeout,
            "revocation write",
            self.ledger
                .revoke(jti, claims.expires_at() + self.codec.leeway()),
        )
        .await?;

        tracing::info!(user_id = claims.user_id, "Session revoked");
        Ok(())
    }
}
