//! Claim set carried by every credential.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::config::SESSION_LIFETIME;

/// Role granted to the holder of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account.
    #[default]
    User,
    /// Administrator (coach) account.
    Admin,
}

impl Role {
    /// Returns the role as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Returns `true` for [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{other}', expected 'user' or 'admin'")),
        }
    }
}

/// Claims of a session or reset credential.
///
/// Standard claims use their registered names; the two custom claims are
/// `userId` and `userRole`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Credential ID, used for revocation. Absent on reset credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Subject (decimal user ID).
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Not before (Unix timestamp).
    pub nbf: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Numeric account ID.
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Role resolved at issuance.
    #[serde(rename = "userRole")]
    pub user_role: Role,
}

impl AccessClaims {
    /// Creates a new builder. Defaults: issued now, session lifetime,
    /// fresh random ID.
    #[must_use]
    pub fn builder(issuer: impl Into<String>, user_id: i64, role: Role) -> AccessClaimsBuilder {
        AccessClaimsBuilder::new(issuer, user_id, role)
    }

    /// Returns the expiry as an instant.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

/// Builder for [`AccessClaims`].
///
/// Defaults: a fresh UUID v4 `jti`, the 14-day session lifetime, and
/// `iat = nbf =` the wall-clock time at construction. Code that runs against
/// an injected [`Clock`](crate::Clock) should start from
/// [`CredentialCodec::claims`](super::CredentialCodec::claims) instead, which
/// stamps the codec's clock.
pub struct AccessClaimsBuilder {
    iss: String,
    user_id: i64,
    role: Role,
    issued_at: i64,
    lifetime: Duration,
    jti: Option<String>,
}

impl AccessClaimsBuilder {
    fn new(issuer: impl Into<String>, user_id: i64, role: Role) -> Self {
        Self {
            iss: issuer.into(),
            user_id,
            role,
            issued_at: OffsetDateTime::now_utc().unix_timestamp(),
            lifetime: SESSION_LIFETIME,
            jti: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Sets `iat` and `nbf`.
    #[must_use]
    pub fn issued_at(mut self, at: OffsetDateTime) -> Self {
        self.issued_at = at.unix_timestamp();
        self
    }

    /// Sets the lifetime; `exp = iat + lifetime`.
    #[must_use]
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Drops the credential ID.
    #[must_use]
    pub fn without_id(mut self) -> Self {
        self.jti = None;
        self
    }

    /// Builds the claims.
    #[must_use]
    pub fn build(self) -> AccessClaims {
        AccessClaims {
            jti: self.jti,
            sub: self.user_id.to_string(),
            iss: self.iss,
            iat: self.issued_at,
            nbf: self.issued_at,
            exp: self.issued_at.saturating_add(self.lifetime.whole_seconds()),
            user_id: self.user_id,
            user_role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_builder_defaults() {
        let claims = AccessClaims::builder("fit-profi-api", 42, Role::User)
            .issued_at(datetime!(2024-03-01 10:00 UTC))
            .build();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 14 * 24 * 3600);
        assert!(claims.jti.is_some());
        assert_eq!(claims.expires_at(), datetime!(2024-03-15 10:00 UTC));
    }

    #[test]
    fn test_builder_without_id() {
        let claims = AccessClaims::builder("fit-profi-api", 7, Role::Admin)
            .lifetime(Duration::minutes(15))
            .without_id()
            .build();

        assert!(claims.jti.is_none());
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_wire_names() {
        let claims = AccessClaims::builder("fit-profi-api", 42, Role::Admin).build();
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["userId"], 42);
        assert_eq!(json["userRole"], "admin");
        assert_eq!(json["sub"], "42");
        assert!(json.get("jti").is_some());

        let reset = AccessClaims::builder("fit-profi-api", 42, Role::User)
            .without_id()
            .build();
        let json = serde_json::to_value(&reset).unwrap();
        assert!(json.get("jti").is_none());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }
}
