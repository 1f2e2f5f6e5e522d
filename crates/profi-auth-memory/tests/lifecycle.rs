//! End-to-end credential lifecycle against the in-memory backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use profi_auth::{
    AccountService, AuthConfig, AuthError, AuthResult, CredentialCodec, EmailSender,
    ManualClock, OutgoingEmail, PasswordConfig, RevocationLedger, Role, StateSigner,
};
use profi_auth_memory::{MemoryAccountStore, MemoryRevocationLedger};
use time::Duration;
use time::macros::datetime;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

#[derive(Default)]
struct CapturingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl CapturingMailer {
    fn last_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let body = &sent.last().expect("no email sent").body;
        let start = body.find("<b>").unwrap() + 3;
        let end = body.find("</b>").unwrap();
        body[start..end].to_string()
    }
}

#[async_trait]
impl EmailSender for CapturingMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> AuthResult<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct Harness {
    service: AccountService,
    accounts: Arc<MemoryAccountStore>,
    ledger: Arc<MemoryRevocationLedger>,
    mailer: Arc<CapturingMailer>,
    clock: Arc<ManualClock>,
    config: AuthConfig,
}

fn harness() -> Harness {
    let config = AuthConfig::new("fit-profi-api", SECRET)
        .with_administrator("Coach Admin", "coach@fitprofi.app")
        .with_password(PasswordConfig {
            cost: 4,
            iterations: 1,
            parallelism: 1,
        });
    let clock = Arc::new(ManualClock::new(datetime!(2024-03-01 10:00 UTC)));
    let accounts = Arc::new(MemoryAccountStore::with_clock(clock.clone()));
    let ledger = Arc::new(MemoryRevocationLedger::with_clock(clock.clone()));
    let mailer = Arc::new(CapturingMailer::default());

    let service = AccountService::new(
        &config,
        accounts.clone(),
        ledger.clone(),
        mailer.clone(),
        clock.clone(),
    )
    .unwrap();

    Harness {
        service,
        accounts,
        ledger,
        mailer,
        clock,
        config,
    }
}

#[tokio::test]
async fn session_expires_after_fourteen_days_plus_leeway() {
    let h = harness();
    let token = h.service.sessions().issue_session(42, Role::User).unwrap();

    let identity = h.service.verify(&token).await.unwrap();
    assert_eq!(identity.user_id, 42);
    assert_eq!(identity.role, Role::User);

    h.clock.advance(Duration::days(14) + Duration::seconds(60));
    assert!(h.service.verify(&token).await.is_some());

    h.clock.advance(Duration::seconds(1));
    assert!(h.service.verify(&token).await.is_none());
}

#[tokio::test]
async fn revoked_session_is_rejected_but_still_decodes() {
    let h = harness();
    let session = h.service.register("Ann", "ann@x.io", "s3cret").await.unwrap();

    h.service.logout(&session.token).await.unwrap();
    assert!(h.service.verify(&session.token).await.is_none());

    let codec = CredentialCodec::from_config(&h.config, h.clock.clone());
    let claims = codec.decode(&session.token).unwrap();
    assert!(
        h.ledger
            .is_revoked(claims.jti.as_deref().unwrap())
            .await
            .unwrap()
    );

    let again = h.service.login("ann@x.io", "s3cret").await.unwrap();
    assert!(h.service.verify(&again.token).await.is_some());
}

#[tokio::test]
async fn revocations_are_purged_after_expiry() {
    let h = harness();
    let session = h.service.register("Ann", "ann@x.io", "s3cret").await.unwrap();
    h.service.logout(&session.token).await.unwrap();

    assert_eq!(h.ledger.cleanup_expired().await.unwrap(), 0);

    // exp + 60s is the last instant the credential decodes.
    h.clock.advance(Duration::days(14) + Duration::seconds(60));
    assert_eq!(h.ledger.cleanup_expired().await.unwrap(), 0);
    assert!(h.service.verify(&session.token).await.is_none());

    h.clock.advance(Duration::seconds(1));
    assert_eq!(h.ledger.cleanup_expired().await.unwrap(), 1);
    assert!(h.service.verify(&session.token).await.is_none());
}

#[tokio::test]
async fn purge_inside_leeway_keeps_session_revoked() {
    let h = harness();
    let session = h.service.register("Ann", "ann@x.io", "s3cret").await.unwrap();
    h.service.logout(&session.token).await.unwrap();

    h.clock.advance(Duration::days(14) + Duration::seconds(30));
    h.ledger.cleanup_expired().await.unwrap();

    assert!(h.service.verify(&session.token).await.is_none());
    assert_eq!(h.ledger.len(), 1);
}

#[tokio::test]
async fn password_reset_changes_password_once() {
    let h = harness();
    h.service.register("Ann", "a@b.com", "old-password").await.unwrap();

    h.service.request_password_reset("a@b.com").await.unwrap();
    let token = h.mailer.last_token();

    h.service.reset_password(&token, "new-password").await.unwrap();

    assert!(h.service.login("a@b.com", "new-password").await.is_ok());
    assert!(matches!(
        h.service.login("a@b.com", "old-password").await,
        Err(AuthError::InvalidPassword)
    ));

    let replay = h.service.reset_password(&token, "third").await.unwrap_err();
    assert!(matches!(replay, AuthError::NotFound { .. }));
    assert_eq!(h.accounts.reset_record_count(), 0);
}

#[tokio::test]
async fn reset_credential_cannot_open_a_session() {
    let h = harness();
    h.service.register("Ann", "a@b.com", "old-password").await.unwrap();
    h.service.request_password_reset("a@b.com").await.unwrap();

    let token = h.mailer.last_token();
    assert!(h.service.verify(&token).await.is_none());
}

#[tokio::test]
async fn expired_reset_credential_leaves_password_untouched() {
    let h = harness();
    h.service.register("Ann", "a@b.com", "old-password").await.unwrap();
    h.service.request_password_reset("a@b.com").await.unwrap();
    let token = h.mailer.last_token();

    h.clock.advance(Duration::minutes(17));
    let err = h.service.reset_password(&token, "new-password").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(h.service.login("a@b.com", "old-password").await.is_ok());
}

#[tokio::test]
async fn reset_for_unknown_email_is_not_found() {
    let h = harness();
    let err = h
        .service
        .request_password_reset("nobody@b.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound { .. }));
}

#[tokio::test]
async fn admin_flag_in_store_promotes_at_next_issuance() {
    let h = harness();
    let before = h.service.register("Ann", "ann@x.io", "s3cret").await.unwrap();
    assert_eq!(before.role, Role::User);

    h.accounts.set_admin("ann@x.io", true).unwrap();

    let old = h.service.verify(&before.token).await.unwrap();
    assert_eq!(old.role, Role::User);

    let after = h.service.login("ann@x.io", "s3cret").await.unwrap();
    let identity = h.service.verify(&after.token).await.unwrap();
    assert!(identity.is_admin());
    assert!(identity.require_owner_or_admin(999).is_ok());
}

#[tokio::test]
async fn signed_state_round_trip() {
    let h = harness();
    let signer = StateSigner::from_config(&h.config, h.clock.clone()).unwrap();
    let state = signer.sign_state(42);

    assert_eq!(signer.verify_state_default(&state), Some(42));

    h.clock.advance(Duration::minutes(10) + Duration::seconds(1));
    assert_eq!(signer.verify_state_default(&state), None);
}
