//! In-memory account store.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use profi_auth::{
    Account, AccountStore, AuthError, AuthResult, Clock, NewAccount, ResetRecord, SystemClock,
};

/// Accounts and reset records kept in concurrent maps.
///
/// Emails are matched ASCII case-insensitively; the address is stored as
/// given at registration. IDs start at 1.
///
/// Reset-record writes are serialized so that replacing the records of an
/// email is atomic.
pub struct MemoryAccountStore {
    accounts: DashMap<String, Account>,
    resets: DashMap<String, ResetRecord>,
    reset_writes: Mutex<()>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl MemoryAccountStore {
    /// Creates an empty store using wall-clock time for cleanup.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store that expires reset records against `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: DashMap::new(),
            resets: DashMap::new(),
            reset_writes: Mutex::new(()),
            next_id: AtomicI64::new(1),
            clock,
        }
    }

    /// Sets the administrator flag of an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if no account has this email.
    pub fn set_admin(&self, email: &str, is_admin: bool) -> AuthResult<()> {
        let mut account = self
            .accounts
            .get_mut(&email_key(email))
            .ok_or_else(|| AuthError::not_found(format!("account {email}")))?;
        account.is_admin = is_admin;
        Ok(())
    }

    fn lock_resets(&self) -> AuthResult<MutexGuard<'_, ()>> {
        self.reset_writes
            .lock()
            .map_err(|_| AuthError::internal("reset record lock poisoned"))
    }

    fn remove_resets_for(&self, email: &str) -> u64 {
        let key = email_key(email);
        let before = self.resets.len();
        self.resets.retain(|_, record| email_key(&record.email) != key);
        before.saturating_sub(self.resets.len()) as u64
    }

    /// Number of outstanding reset records.
    #[must_use]
    pub fn reset_record_count(&self) -> usize {
        self.resets.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, account: NewAccount) -> AuthResult<Account> {
        match self.accounts.entry(email_key(&account.email)) {
            Entry::Occupied(_) => Err(AuthError::conflict(
                "User with this email already exists",
            )),
            Entry::Vacant(slot) => {
                let created = Account {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    full_name: account.full_name,
                    email: account.email,
                    password_hash: account.password_hash,
                    is_admin: false,
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .get(&email_key(email))
            .map(|entry| entry.value().clone()))
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> AuthResult<()> {
        let mut account = self
            .accounts
            .get_mut(&email_key(email))
            .ok_or_else(|| AuthError::not_found("User not registered"))?;
        account.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn create_reset_record(&self, record: ResetRecord) -> AuthResult<()> {
        let _guard = self.lock_resets()?;
        self.resets.insert(record.token_hash.clone(), record);
        Ok(())
    }

    async fn find_reset_record(&self, token_hash: &str) -> AuthResult<Option<ResetRecord>> {
        Ok(self
            .resets
            .get(token_hash)
            .map(|entry| entry.value().clone()))
    }

    async fn delete_reset_record(&self, token_hash: &str) -> AuthResult<()> {
        self.resets.remove(token_hash);
        Ok(())
    }

    async fn replace_reset_record(&self, record: ResetRecord) -> AuthResult<u64> {
        let _guard = self.lock_resets()?;
        let superseded = self.remove_resets_for(&record.email);
        self.resets.insert(record.token_hash.clone(), record);
        Ok(superseded)
    }

    async fn delete_reset_records_for(&self, email: &str) -> AuthResult<u64> {
        let _guard = self.lock_resets()?;
        Ok(self.remove_resets_for(email))
    }

    async fn cleanup_expired_reset_records(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        let before = self.resets.len();
        self.resets.retain(|_, record| !record.is_expired_at(now));
        let removed = before.saturating_sub(self.resets.len()) as u64;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired reset records");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profi_auth::ManualClock;
    use time::macros::datetime;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            full_name: "Ann".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryAccountStore::new();
        let a = store.create_account(new_account("a@x.io")).await.unwrap();
        let b = store.create_account(new_account("b@x.io")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account("a@x.io")).await.unwrap();

        let err = store
            .create_account(new_account("A@X.io"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account("Ann@X.io")).await.unwrap();

        let found = store.find_by_email("ann@x.io").await.unwrap().unwrap();
        assert_eq!(found.email, "Ann@X.io");
        assert!(store.find_by_email("bob@x.io").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account("a@x.io")).await.unwrap();

        store.update_password("a@x.io", "new-hash").await.unwrap();
        let found = store.find_by_email("a@x.io").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "new-hash");

        let err = store.update_password("b@x.io", "h").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_admin() {
        let store = MemoryAccountStore::new();
        store.create_account(new_account("a@x.io")).await.unwrap();

        store.set_admin("a@x.io", true).unwrap();
        assert!(store.find_by_email("a@x.io").await.unwrap().unwrap().is_admin);
        assert!(store.set_admin("b@x.io", true).is_err());
    }

    #[tokio::test]
    async fn test_reset_records() {
        let clock = Arc::new(ManualClock::new(datetime!(2024-03-01 10:00 UTC)));
        let store = MemoryAccountStore::with_clock(clock.clone());
        let now = clock.now();
        let later = now + time::Duration::minutes(15);

        store
            .create_reset_record(ResetRecord::new("a@x.io", "t1", now, later))
            .await
            .unwrap();
        store
            .create_reset_record(ResetRecord::new("A@x.io", "t2", now, later))
            .await
            .unwrap();
        store
            .create_reset_record(ResetRecord::new("b@x.io", "t3", now, later))
            .await
            .unwrap();

        let hash = ResetRecord::hash_token("t1");
        assert!(store.find_reset_record(&hash).await.unwrap().is_some());

        assert_eq!(store.delete_reset_records_for("a@x.io").await.unwrap(), 2);
        assert!(store.find_reset_record(&hash).await.unwrap().is_none());
        assert_eq!(store.reset_record_count(), 1);

        clock.advance(time::Duration::minutes(15));
        assert_eq!(store.cleanup_expired_reset_records().await.unwrap(), 1);
        assert_eq!(store.reset_record_count(), 0);
    }

    #[tokio::test]
    async fn test_replace_reset_record() {
        let clock = Arc::new(ManualClock::new(datetime!(2024-03-01 10:00 UTC)));
        let store = MemoryAccountStore::with_clock(clock.clone());
        let now = clock.now();
        let later = now + time::Duration::minutes(15);

        let first = ResetRecord::new("a@x.io", "t1", now, later);
        assert_eq!(store.replace_reset_record(first).await.unwrap(), 0);

        let second = ResetRecord::new("A@X.io", "t2", now, later);
        assert_eq!(store.replace_reset_record(second).await.unwrap(), 1);

        assert_eq!(store.reset_record_count(), 1);
        let t1 = ResetRecord::hash_token("t1");
        let t2 = ResetRecord::hash_token("t2");
        assert!(store.find_reset_record(&t1).await.unwrap().is_none());
        assert!(store.find_reset_record(&t2).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_replace_keeps_one_record() {
        let store = Arc::new(MemoryAccountStore::new());
        let now = time::OffsetDateTime::now_utc();
        let later = now + time::Duration::minutes(15);

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let record = ResetRecord::new("a@x.io", &format!("token-{i}"), now, later);
                    store.replace_reset_record(record).await.unwrap()
                })
            })
            .collect();

        let mut superseded = 0;
        for task in tasks {
            superseded += task.await.unwrap();
        }

        assert_eq!(store.reset_record_count(), 1);
        assert_eq!(superseded, 31);
    }
}
