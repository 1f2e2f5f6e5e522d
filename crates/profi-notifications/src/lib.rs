//! Email delivery for FitProfi account flows.
//!
//! [`SmtpMailer`] implements [`profi_auth::EmailSender`] on top of `lettre`.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod smtp;

pub use config::MailConfig;
pub use error::NotificationError;
pub use smtp::{SmtpMailer, compose};
