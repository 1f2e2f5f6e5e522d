//! SMTP relay settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NotificationError;

fn default_port() -> u16 {
    587
}

/// SMTP relay settings.
///
/// The sender address defaults to `username`, which is what most relays
/// that authenticate with an app password expect.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct MailConfig {
    /// Relay hostname, e.g. `smtp.gmail.com`.
    pub host: String,
    /// Relay port. 465 uses implicit TLS; anything else upgrades with
    /// STARTTLS.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login for the relay.
    #[serde(default)]
    pub username: Option<String>,
    /// Password or app password for the relay. Redacted from `Debug`.
    #[serde(default)]
    pub password: Option<String>,
    /// Sender address; defaults to `username`.
    #[serde(default)]
    pub from: Option<String>,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .finish()
    }
}

impl MailConfig {
    /// Address messages are sent from.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }

    /// Checks that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::InvalidConfig` if:
    /// - the host is empty or the port is 0
    /// - neither `from` nor `username` is set
    /// - only one of `username` and `password` is set
    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.host.trim().is_empty() {
            return Err(NotificationError::InvalidConfig("Missing mail.host".into()));
        }
        if self.port == 0 {
            return Err(NotificationError::InvalidConfig(
                "mail.port must be greater than 0".into(),
            ));
        }
        if self.sender().is_none() {
            return Err(NotificationError::InvalidConfig(
                "Missing mail.from or mail.username".into(),
            ));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(NotificationError::InvalidConfig(
                "mail.username and mail.password must be set together".into(),
            ));
        }
        Ok(())
    }
}
