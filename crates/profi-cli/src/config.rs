use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use profi_auth::AuthConfig;
use profi_notifications::MailConfig;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "profi.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub mail: Option<MailConfig>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Returns the auth section after validating it.
    pub fn validated_auth(&self) -> Result<&AuthConfig> {
        self.auth
            .validate()
            .context("invalid [auth] configuration (set auth.secret or PROFI__AUTH__SECRET)")?;
        Ok(&self.auth)
    }

    /// Returns the mail section, failing when it is absent.
    pub fn require_mail(&self) -> Result<&MailConfig> {
        self.mail
            .as_ref()
            .context("missing [mail] configuration")
    }
}

/// Loads configuration from an optional TOML file, then applies
/// `PROFI__SECTION__KEY` environment overrides.
///
/// An explicitly given path must exist; the default `profi.toml` is only
/// read when present.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("config file not found: {}", p.display());
            }
            builder = builder.add_source(File::from(p.to_path_buf()));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                builder = builder.add_source(File::from(default_path));
            }
        }
    }
    // e.g. PROFI__AUTH__SECRET, PROFI__MAIL__HOST
    builder = builder.add_source(
        Environment::with_prefix("PROFI")
            .try_parsing(true)
            .separator("__"),
    );

    let cfg = builder.build().context("config build error")?;
    cfg.try_deserialize().context("config deserialize error")
}
