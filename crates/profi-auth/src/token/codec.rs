//! HS256 credential codec.
//!
//! Tokens are compact JWS strings signed with a shared secret. Decoding
//! enforces, in order: the HS256 allow-list, the signature, the issuer, the
//! presence of `exp`/`nbf`/`iat`, and finally the validity window against the
//! injected [`Clock`]:
//!
//! ```text
//! nbf - leeway <= now <= exp + leeway
//! ```
//!
//! The window is checked here rather than by `jsonwebtoken` so that it runs
//! against the injected clock instead of the system time.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::claims::{AccessClaims, AccessClaimsBuilder, Role};
use crate::clock::Clock;
use crate::config::AuthConfig;

/// Reasons a credential failed to encode or decode.
///
/// These never leave the crate as-is: [`AuthError`](crate::AuthError)
/// collapses every decoding failure into a single "invalid credential".
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Signing or serialization failed.
    #[error("Failed to encode credential: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// Not a well-formed credential (bad segments, base64, JSON or claims).
    #[error("Malformed credential: {message}")]
    Malformed {
        /// Description of what was malformed.
        message: String,
    },

    /// Signature did not verify.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Header names an algorithm other than HS256.
    #[error("Algorithm not allowed")]
    InvalidAlgorithm,

    /// `iss` does not match the configured issuer.
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// `exp + leeway` is in the past.
    #[error("Credential expired")]
    Expired,

    /// `nbf - leeway` is in the future.
    #[error("Credential not yet valid")]
    NotYetValid,
}

impl CodecError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::InvalidAlgorithm,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::malformed(err.to_string()),
        }
    }
}

/// Encodes and decodes [`AccessClaims`] with HS256.
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    leeway: i64,
    clock: Arc<dyn Clock>,
}

impl CredentialCodec {
    /// Creates a codec for the given secret and issuer.
    #[must_use]
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        leeway_secs: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss"]);
        // Time window checked in `decode_at` against the injected clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
            leeway: leeway_secs.max(0),
            clock,
        }
    }

    /// Creates a codec from the subsystem configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config.secret.as_bytes(),
            config.issuer.clone(),
            config.leeway_secs(),
            clock,
        )
    }

    /// Returns the configured issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the tolerated clock skew.
    #[must_use]
    pub fn leeway(&self) -> time::Duration {
        time::Duration::seconds(self.leeway)
    }

    /// Returns the clock this codec checks windows against.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Starts claims for this codec's issuer, issued at the current time
    /// of the injected clock.
    #[must_use]
    pub fn claims(&self, user_id: i64, role: Role) -> AccessClaimsBuilder {
        AccessClaims::builder(&self.issuer, user_id, role).issued_at(self.clock.now())
    }

    /// Signs the claims.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encoding` if serialization or signing fails.
    pub fn encode(&self, claims: &AccessClaims) -> Result<String, CodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CodecError::encoding(e.to_string()))
    }

    /// Verifies a credential against the current time of the injected clock.
    ///
    /// # Errors
    ///
    /// Returns the specific [`CodecError`] describing why the credential
    /// was rejected.
    pub fn decode(&self, token: &str) -> Result<AccessClaims, CodecError> {
        self.decode_at(token, self.clock.unix_now())
    }

    /// Verifies a credential as of the given Unix timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode).
    pub fn decode_at(&self, token: &str, now: i64) -> Result<AccessClaims, CodecError> {
        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.exp.saturating_add(self.leeway) < now {
            return Err(CodecError::Expired);
        }
        if claims.nbf.saturating_sub(self.leeway) > now {
            return Err(CodecError::NotYetValid);
        }

        Ok(claims)
    }
}
