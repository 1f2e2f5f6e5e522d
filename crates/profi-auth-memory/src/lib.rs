//! In-memory storage backend for `profi-auth`.
//!
//! Implements [`AccountStore`](profi_auth::AccountStore) and
//! [`RevocationLedger`](profi_auth::RevocationLedger) on top of `dashmap`.
//! State lives in the current process only, which makes this backend suited
//! to tests, local development and the `profi` CLI, but not to deployments
//! with more than one verifying process.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use profi_auth_memory::{MemoryAccountStore, MemoryRevocationLedger};
//!
//! let accounts = Arc::new(MemoryAccountStore::new());
//! let ledger = Arc::new(MemoryRevocationLedger::new());
//! let service = AccountService::new(&config, accounts, ledger, mailer, clock)?;
//! ```

pub mod accounts;
pub mod ledger;

pub use accounts::MemoryAccountStore;
pub use ledger::MemoryRevocationLedger;
