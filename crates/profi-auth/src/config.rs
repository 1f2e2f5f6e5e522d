//! Configuration for the access-credential subsystem.
//!
//! [`AuthConfig`] is built once at startup (see the `profi` CLI for a loader
//! that merges a TOML file with `PROFI__*` environment variables) and handed
//! to every service constructor. Nothing in this crate reads the environment.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifetime of a session credential. Not configurable.
pub const SESSION_LIFETIME: time::Duration = time::Duration::days(14);

/// Lifetime of a password-reset credential. Not configurable.
pub const RESET_TOKEN_LIFETIME: time::Duration = time::Duration::minutes(15);

/// Minimum accepted length of the shared HMAC secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Root configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "fit-profi-api"
/// secret = "change-me-change-me-change-me-change-me"
/// leeway = "60s"
/// state_max_age = "10m"
///
/// [[auth.administrators]]
/// full_name = "Coach Admin"
/// email = "admin@fitprofi.app"
///
/// [auth.password]
/// cost = 14
/// ```
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Value of the `iss` claim; decoding rejects any other issuer.
    pub issuer: String,

    /// Shared HMAC-SHA256 secret for credentials and signed state.
    pub secret: String,

    /// Tolerated clock skew when checking `exp` and `nbf`.
    #[serde(with = "humantime_serde")]
    pub leeway: Duration,

    /// Default maximum age of a signed state token.
    #[serde(with = "humantime_serde")]
    pub state_max_age: Duration,

    /// Upper bound on any single store or email call.
    #[serde(with = "humantime_serde")]
    pub store_timeout: Duration,

    /// Accounts promoted to the admin role at issuance time.
    pub administrators: Vec<AdminIdentity>,

    /// Password hashing cost.
    pub password: PasswordConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "fit-profi-api".to_string(),
            secret: String::new(),
            leeway: Duration::from_secs(60),
            state_max_age: Duration::from_secs(10 * 60),
            store_timeout: Duration::from_secs(5),
            administrators: Vec::new(),
            password: PasswordConfig::default(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("secret", &"<redacted>")
            .field("leeway", &self.leeway)
            .field("state_max_age", &self.state_max_age)
            .field("store_timeout", &self.store_timeout)
            .field("administrators", &self.administrators)
            .field("password", &self.password)
            .finish()
    }
}

impl AuthConfig {
    /// Creates a configuration with the given issuer and secret and defaults
    /// for everything else.
    #[must_use]
    pub fn new(issuer: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Adds an administrator to the allow-list.
    #[must_use]
    pub fn with_administrator(
        mut self,
        full_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.administrators.push(AdminIdentity {
            full_name: full_name.into(),
            email: email.into(),
        });
        self
    }

    /// Sets the password hashing cost.
    #[must_use]
    pub fn with_password(mut self, password: PasswordConfig) -> Self {
        self.password = password;
        self
    }

    /// Sets the collaborator call bound.
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Returns the leeway in whole seconds.
    #[must_use]
    pub fn leeway_secs(&self) -> i64 {
        i64::try_from(self.leeway.as_secs()).unwrap_or(i64::MAX)
    }

    /// Returns `true` if the identity appears in the administrator allow-list.
    ///
    /// Names compare exactly; emails compare ASCII case-insensitively.
    #[must_use]
    pub fn is_administrator(&self, full_name: &str, email: &str) -> bool {
        self.administrators
            .iter()
            .any(|admin| admin.full_name == full_name && admin.email.eq_ignore_ascii_case(email))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the secret is empty and
    /// `ConfigError::InvalidValue` if:
    /// - the issuer is empty
    /// - the secret is shorter than [`MIN_SECRET_LEN`] bytes
    /// - the leeway exceeds five minutes
    /// - the state max-age or store timeout is zero
    /// - an administrator entry has an empty email
    /// - the password cost parameters are out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.secret.is_empty() {
            return Err(ConfigError::Missing("secret".to_string()));
        }

        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        if self.leeway > Duration::from_secs(300) {
            return Err(ConfigError::InvalidValue(
                "leeway must not exceed 5m".to_string(),
            ));
        }

        if self.state_max_age.is_zero() {
            return Err(ConfigError::InvalidValue(
                "state_max_age must be greater than 0".to_string(),
            ));
        }

        if self.store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "store_timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(admin) = self
            .administrators
            .iter()
            .find(|a| a.email.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue(format!(
                "administrator '{}' has no email",
                admin.full_name
            )));
        }

        self.password.validate()
    }
}

/// An entry of the administrator allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdminIdentity {
    /// Display name the account must carry.
    pub full_name: String,
    /// Email the account must carry.
    pub email: String,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost as a power of two, in KiB (14 → 16 MiB).
    pub cost: u32,

    /// Number of passes over memory.
    pub iterations: u32,

    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            cost: 14,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    /// Returns the memory cost in KiB.
    #[must_use]
    pub fn memory_kib(&self) -> u32 {
        1u32.checked_shl(self.cost).unwrap_or(u32::MAX)
    }

    /// Validates the cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the cost is outside `3..=22`,
    /// iterations or parallelism are zero, or memory is below Argon2's
    /// minimum of 8 KiB per lane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(3..=22).contains(&self.cost) {
            return Err(ConfigError::InvalidValue(
                "password.cost must be between 3 and 22".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "password.iterations must be greater than 0".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::InvalidValue(
                "password.parallelism must be greater than 0".to_string(),
            ));
        }
        if self.memory_kib() < 8 * self.parallelism {
            return Err(ConfigError::InvalidValue(
                "password.cost is too small for the configured parallelism".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}
