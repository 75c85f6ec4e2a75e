use chrono::{Duration, Utc};
use keystone_store::{MemoryTokenStore, TokenStore};
use keystone_types::{EntityId, LifecycleToken, TokenPurpose};
use std::sync::Arc;

fn token(value: &str, subject: i64, purpose: TokenPurpose, ttl_secs: i64) -> LifecycleToken {
    let now = Utc::now();
    LifecycleToken {
        value: value.to_string(),
        purpose,
        subject: EntityId::new(subject),
        issued_at: now,
        expires_at: now + Duration::seconds(ttl_secs),
        consumed: false,
    }
}

#[tokio::test]
async fn consume_succeeds_exactly_once() {
    let store = MemoryTokenStore::new();
    store
        .put(token("t1", 1, TokenPurpose::PasswordReset, 3600))
        .await
        .unwrap();

    let first = store
        .consume("t1", TokenPurpose::PasswordReset, Utc::now())
        .await
        .unwrap();
    assert_eq!(first, Some(EntityId::new(1)));

    let second = store
        .consume("t1", TokenPurpose::PasswordReset, Utc::now())
        .await
        .unwrap();
    assert_eq!(second, None);
}

#[tokio::test]
async fn consume_rejects_unknown_value() {
    let store = MemoryTokenStore::new();
    let got = store
        .consume("nope", TokenPurpose::PasswordReset, Utc::now())
        .await
        .unwrap();
    assert_eq!(got, None);
}

#[tokio::test]
async fn consume_rejects_wrong_purpose() {
    let store = MemoryTokenStore::new();
    store
        .put(token("t1", 1, TokenPurpose::EmailVerification, 3600))
        .await
        .unwrap();

    let got = store
        .consume("t1", TokenPurpose::PasswordReset, Utc::now())
        .await
        .unwrap();
    assert_eq!(got, None);

    // The failed attempt must not have burned the token.
    let got = store
        .consume("t1", TokenPurpose::EmailVerification, Utc::now())
        .await
        .unwrap();
    assert_eq!(got, Some(EntityId::new(1)));
}

#[tokio::test]
async fn consume_rejects_expired_token_on_first_attempt() {
    let store = MemoryTokenStore::new();
    store
        .put(token("t1", 1, TokenPurpose::PasswordReset, 3600))
        .await
        .unwrap();

    let later = Utc::now() + Duration::seconds(7200);
    let got = store
        .consume("t1", TokenPurpose::PasswordReset, later)
        .await
        .unwrap();
    assert_eq!(got, None);
}

#[tokio::test]
async fn put_replaces_live_token_for_same_subject_and_purpose() {
    let store = MemoryTokenStore::new();
    store
        .put(token("old", 1, TokenPurpose::PasswordReset, 3600))
        .await
        .unwrap();
    store
        .put(token("new", 1, TokenPurpose::PasswordReset, 3600))
        .await
        .unwrap();

    assert_eq!(
        store.live_count(EntityId::new(1), TokenPurpose::PasswordReset).await,
        1
    );
    assert_eq!(
        store
            .consume("old", TokenPurpose::PasswordReset, Utc::now())
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        store
            .consume("new", TokenPurpose::PasswordReset, Utc::now())
            .await
            .unwrap(),
        Some(EntityId::new(1))
    );
}

#[tokio::test]
async fn put_does_not_disturb_other_subjects_or_purposes() {
    let store = MemoryTokenStore::new();
    store
        .put(token("a", 1, TokenPurpose::PasswordReset, 3600))
        .await
        .unwrap();
    store
        .put(token("b", 1, TokenPurpose::EmailVerification, 3600))
        .await
        .unwrap();
    store
        .put(token("c", 2, TokenPurpose::PasswordReset, 3600))
        .await
        .unwrap();

    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn concurrent_consume_admits_at_most_one_winner() {
    let store = Arc::new(MemoryTokenStore::new());
    store
        .put(token("shared", 1, TokenPurpose::PasswordReset, 3600))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .consume("shared", TokenPurpose::PasswordReset, Utc::now())
                .await
                .unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}
