use async_trait::async_trait;
use keystone_credential::{CredentialManager, KdfParams};
use keystone_engine::{AccountService, CommandEngine, EngineError, Notifier, NotifyError};
use keystone_model::TypeRegistry;
use keystone_session::SessionSigner;
use keystone_store::{EntityStore, MemoryEntityStore, MemoryTokenStore, TokenStore};
use keystone_token::TokenLifecycleManager;
use keystone_types::{EntityId, TokenPurpose};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Pulls the token out of the last delivered body
    /// ("Your ... token is: {token}").
    fn last_token(&self) -> String {
        let messages = self.sent.lock().unwrap();
        let (_, _, body) = messages.last().expect("no notification delivered");
        body.rsplit(": ").next().unwrap().to_string()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

struct Harness {
    accounts: AccountService,
    engine: Arc<CommandEngine>,
    entity_store: Arc<MemoryEntityStore>,
    token_store: Arc<MemoryTokenStore>,
    notifier: Arc<RecordingNotifier>,
    signer: SessionSigner,
}

fn harness() -> Harness {
    let entity_store = Arc::new(MemoryEntityStore::new());
    let token_store = Arc::new(MemoryTokenStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let tokens = Arc::new(TokenLifecycleManager::new(
        Arc::clone(&token_store) as Arc<dyn TokenStore>,
    ));
    let credentials = CredentialManager::new(KdfParams::fast_insecure());
    let signer = SessionSigner::new([7u8; 32]);
    let engine = Arc::new(CommandEngine::new(
        Arc::new(TypeRegistry::builtin()),
        Arc::clone(&entity_store) as Arc<dyn EntityStore>,
        Arc::clone(&tokens),
        credentials.clone(),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    ));
    let accounts = AccountService::new(
        Arc::clone(&engine),
        Arc::clone(&entity_store) as Arc<dyn EntityStore>,
        tokens,
        credentials,
        signer.clone(),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    Harness {
        accounts,
        engine,
        entity_store,
        token_store,
        notifier,
        signer,
    }
}

async fn register_alice(h: &Harness) -> EntityId {
    h.accounts
        .register("alice", "s3cr3t!pw", "a@x.com")
        .await
        .unwrap()
}

// ── register ─────────────────────────────────────────────────────

#[tokio::test]
async fn register_persists_user_and_sends_verification() {
    let h = harness();
    let id = register_alice(&h).await;
    assert_eq!(id, EntityId::new(1));

    let view = h.engine.show("User", id).await.unwrap();
    assert_eq!(view.get("Username").unwrap().as_str(), Some("alice"));
    assert_eq!(
        h.token_store
            .live_count(id, TokenPurpose::EmailVerification)
            .await,
        1
    );
    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].1, "Email Verification");
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let h = harness();
    register_alice(&h).await;
    let err = h
        .accounts
        .register("alice", "other-pw!!", "b@x.com")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Conflict("username already exists".to_string()));
    assert_eq!(h.entity_store.len().await, 1);
}

#[tokio::test]
async fn register_rejects_bad_signup_input() {
    let h = harness();
    for (username, password, email) in [
        ("al", "s3cr3t!pw", "a@x.com"),
        ("alice", "short", "a@x.com"),
        ("alice", "s3cr3t!pw", "not-an-email"),
    ] {
        let err = h
            .accounts
            .register(username, password, email)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
    assert!(h.entity_store.is_empty().await);
}

// ── authenticate ─────────────────────────────────────────────────

#[tokio::test]
async fn authenticate_issues_a_validatable_session() {
    let h = harness();
    let id = register_alice(&h).await;

    let token = h.accounts.authenticate("alice", "s3cr3t!pw").await.unwrap();
    let subject = h.signer.validate(&token).unwrap();
    assert_eq!(subject, id);
}

#[tokio::test]
async fn authenticate_rejects_wrong_password() {
    let h = harness();
    register_alice(&h).await;
    let err = h
        .accounts
        .authenticate("alice", "wrong-pw!")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);
}

#[tokio::test]
async fn authenticate_reports_unknown_user_as_bad_credentials() {
    let h = harness();
    let err = h
        .accounts
        .authenticate("nobody", "s3cr3t!pw")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);
}

// ── password reset ───────────────────────────────────────────────

#[tokio::test]
async fn reset_request_for_unknown_email_reports_success_silently() {
    let h = harness();
    h.accounts
        .request_password_reset("ghost@x.com")
        .await
        .unwrap();
    assert!(h.token_store.is_empty().await);
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn reset_flow_replaces_the_password() {
    let h = harness();
    register_alice(&h).await;

    h.accounts.request_password_reset("a@x.com").await.unwrap();
    let token = h.notifier.last_token();

    h.accounts
        .consume_password_reset(&token, "n3w-pass!!")
        .await
        .unwrap();

    assert!(matches!(
        h.accounts.authenticate("alice", "s3cr3t!pw").await,
        Err(EngineError::InvalidCredentials)
    ));
    h.accounts.authenticate("alice", "n3w-pass!!").await.unwrap();
}

#[tokio::test]
async fn reset_token_is_single_use() {
    let h = harness();
    register_alice(&h).await;
    h.accounts.request_password_reset("a@x.com").await.unwrap();
    let token = h.notifier.last_token();

    h.accounts
        .consume_password_reset(&token, "n3w-pass!!")
        .await
        .unwrap();
    let err = h
        .accounts
        .consume_password_reset(&token, "th1rd-pw!!")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidOrExpired);
}

#[tokio::test]
async fn reset_rejects_verification_tokens() {
    let h = harness();
    register_alice(&h).await;
    // The only delivered token so far is the verification token.
    let token = h.notifier.last_token();
    let err = h
        .accounts
        .consume_password_reset(&token, "n3w-pass!!")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidOrExpired);
}

#[tokio::test]
async fn reset_rejects_short_replacement_password() {
    let h = harness();
    let err = h
        .accounts
        .consume_password_reset("whatever", "short")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

// ── email verification ───────────────────────────────────────────

#[tokio::test]
async fn verification_marks_the_user_verified() {
    let h = harness();
    let id = register_alice(&h).await;
    let token = h.notifier.last_token();

    let verified = h.accounts.consume_email_verification(&token).await.unwrap();
    assert_eq!(verified, id);

    let view = h.engine.show("User", id).await.unwrap();
    assert_eq!(view.get("Verified").unwrap().as_bool(), Some(true));
}

#[tokio::test]
async fn verification_rejects_garbage_tokens() {
    let h = harness();
    register_alice(&h).await;
    let err = h
        .accounts
        .consume_email_verification("not-a-token")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidOrExpired);
}

// ── change password ──────────────────────────────────────────────

#[tokio::test]
async fn change_password_rehashes_with_a_new_salt() {
    let h = harness();
    let id = register_alice(&h).await;
    let before = h
        .entity_store
        .fetch("User", id)
        .await
        .unwrap()
        .unwrap()
        .credential
        .unwrap();

    h.accounts
        .change_password(id, "s3cr3t!pw", "n3w-pass!!")
        .await
        .unwrap();

    let after = h
        .entity_store
        .fetch("User", id)
        .await
        .unwrap()
        .unwrap()
        .credential
        .unwrap();
    assert_ne!(before.salt, after.salt, "replacement credential reuses salt");
    assert_ne!(before.password_hash, after.password_hash);

    assert!(matches!(
        h.accounts.authenticate("alice", "s3cr3t!pw").await,
        Err(EngineError::InvalidCredentials)
    ));
    h.accounts.authenticate("alice", "n3w-pass!!").await.unwrap();
}

#[tokio::test]
async fn change_password_rejects_wrong_old_password() {
    let h = harness();
    let id = register_alice(&h).await;
    let err = h
        .accounts
        .change_password(id, "wrong-pw!", "n3w-pass!!")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);
}

#[tokio::test]
async fn change_password_for_unknown_id_is_bad_credentials() {
    let h = harness();
    let err = h
        .accounts
        .change_password(EntityId::new(42), "s3cr3t!pw", "n3w-pass!!")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);
}
