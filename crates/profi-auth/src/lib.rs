//! # profi-auth
//!
//! Access-credential lifecycle for the FitProfi API.
//!
//! This crate provides:
//! - HS256 session credentials with a 14-day lifetime and revocation
//! - Single-use, 15-minute password-reset credentials delivered by email
//! - HMAC-signed state tokens for third-party redirect flows
//! - Argon2id password hashing
//! - An account facade (register, login, logout, password recovery)
//!
//! ## Overview
//!
//! Every protected operation in the surrounding application calls into this
//! crate with a raw bearer string. Durable state (accounts, reset records,
//! revoked credential IDs) lives behind the [`storage`] traits; email
//! delivery lives behind [`mail::EmailSender`]. Time comes from an injected
//! [`Clock`].
//!
//! ## Modules
//!
//! - [`config`] - Subsystem configuration and fixed lifetimes
//! - [`token`] - Credential codec, session and reset services
//! - [`state`] - Signed state tokens
//! - [`password`] - Password hashing
//! - [`service`] - Account facade
//! - [`storage`] - Storage traits
//! - [`mail`] - Outgoing email seam

pub mod clock;
pub mod config;
pub mod error;
pub mod mail;
pub mod password;
pub mod service;
pub mod state;
pub mod storage;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AdminIdentity, AuthConfig, ConfigError, PasswordConfig};
pub use error::{AuthError, ErrorKind};
pub use mail::{EmailSender, OutgoingEmail};
pub use password::PasswordHasher;
pub use service::{AccountService, AuthSession};
pub use state::StateSigner;
pub use storage::{Account, AccountStore, NewAccount, ResetRecord, RevocationLedger};
pub use token::{
    AccessClaims, CodecError, CredentialCodec, ResetTokenService, Role, SessionIdentity,
    SessionTokenService,
};

/// Type alias for results of this crate.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use profi_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{AuthConfig, ConfigError, PasswordConfig};
    pub use crate::error::{AuthError, ErrorKind};
    pub use crate::mail::{EmailSender, OutgoingEmail};
    pub use crate::service::{AccountService, AuthSession};
    pub use crate::state::StateSigner;
    pub use crate::storage::{Account, AccountStore, NewAccount, ResetRecord, RevocationLedger};
    pub use crate::token::{Role, SessionIdentity};
}
