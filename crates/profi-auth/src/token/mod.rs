//! Credential issuance and verification.
//!
//! - [`codec`] - HS256 encoding and window checks
//! - [`session`] - 14-day revocable session credentials
//! - [`reset`] - 15-minute single-use password-reset credentials

pub mod claims;
pub mod codec;
pub mod reset;
pub mod session;

pub use claims::{AccessClaims, AccessClaimsBuilder, Role};
pub use codec::{CodecError, CredentialCodec};
pub use reset::ResetTokenService;
pub use session::{SessionIdentity, SessionTokenService};
