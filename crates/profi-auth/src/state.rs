//! Signed state tokens for third-party redirect flows.
//!
//! A state token binds a user ID to the moment it was issued:
//!
//! ```text
//! base64url(payload) "." base64url(HMAC-SHA256(secret, payload))
//! payload = "<user_id>:<unix_seconds>"
//! ```
//!
//! Both segments are unpadded base64url. The token carries no other claims
//! and is never revocable; its only defence is the age bound checked on
//! verification.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies state tokens.
#[derive(Clone)]
pub struct StateSigner {
    mac: HmacSha256,
    clock: Arc<dyn Clock>,
    leeway: i64,
    default_max_age: Duration,
}

impl StateSigner {
    /// Creates a signer keyed with `secret`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the key is rejected.
    pub fn new(
        secret: &[u8],
        clock: Arc<dyn Clock>,
        leeway_secs: i64,
        default_max_age: Duration,
    ) -> AuthResult<Self> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AuthError::configuration(format!("invalid state key: {e}")))?;
        Ok(Self {
            mac,
            clock,
            leeway: leeway_secs.max(0),
            default_max_age,
        })
    }

    /// Creates a signer from the subsystem configuration.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &AuthConfig, clock: Arc<dyn Clock>) -> AuthResult<Self> {
        Self::new(
            config.secret.as_bytes(),
            clock,
            config.leeway_secs(),
            config.state_max_age,
        )
    }

    /// Signs `user_id` together with the current time.
    #[must_use]
    pub fn sign_state(&self, user_id: i64) -> String {
        let payload = format!("{user_id}:{}", self.clock.unix_now());
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Verifies a state token and returns its user ID.
    ///
    /// Returns `None` if the token is malformed, the signature does not
    /// match, it is older than `max_age`, or it claims to be issued further
    /// in the future than the leeway allows.
    #[must_use]
    pub fn verify_state(&self, state: &str, max_age: Duration) -> Option<i64> {
        let (payload_b64, signature_b64) = state.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

        let mut mac = self.mac.clone();
        mac.update(&payload);
        if mac.verify_slice(&signature).is_err() {
            tracing::debug!("State signature mismatch");
            return None;
        }

        let payload = std::str::from_utf8(&payload).ok()?;
        let (user_id, issued_at) = payload.split_once(':')?;
        let user_id: i64 = user_id.parse().ok()?;
        let issued_at: i64 = issued_at.parse().ok()?;

        let age = self.clock.unix_now().saturating_sub(issued_at);
        let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        if age > max_age {
            tracing::debug!(user_id, age, "State expired");
            return None;
        }
        if age < -self.leeway {
            tracing::debug!(user_id, age, "State issued in the future");
            return None;
        }

        Some(user_id)
    }

    /// Verifies a state token against the configured default max age.
    #[must_use]
    pub fn verify_state_default(&self, state: &str) -> Option<i64> {
        self.verify_state(state, self.default_max_age)
    }
}
