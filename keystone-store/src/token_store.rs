use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keystone_types::{EntityId, LifecycleToken, TokenPurpose};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Lifecycle token persistence.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Stores a freshly issued token.
    ///
    /// Any live token for the same (subject, purpose) pair is dropped first,
    /// so at most one outstanding token exists per pair.
    async fn put(&self, token: LifecycleToken) -> StoreResult<()>;

    /// Atomically redeems a token by raw value.
    ///
    /// Returns the bound subject id only when the value exists, carries the
    /// right purpose, has not been consumed, and has not expired at `now` —
    /// and marks it consumed in the same step. At most one caller ever
    /// receives `Some` for a given value.
    async fn consume(
        &self,
        value: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<EntityId>>;
}

/// In-memory [`TokenStore`].
///
/// A single mutex spans the lookup-and-mark in `consume`, which provides the
/// atomic conditional update the contract requires.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<String, LifecycleToken>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tokens for a subject/purpose pair. Test observability.
    pub async fn live_count(&self, subject: EntityId, purpose: TokenPurpose) -> usize {
        let now = Utc::now();
        self.tokens
            .lock()
            .await
            .values()
            .filter(|t| t.subject == subject && t.purpose == purpose && t.is_live(now))
            .count()
    }

    /// Total number of stored tokens, consumed ones included.
    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    /// Returns true if no tokens are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, token: LifecycleToken) -> StoreResult<()> {
        let mut tokens = self.tokens.lock().await;
        tokens.retain(|_, t| {
            t.consumed || t.subject != token.subject || t.purpose != token.purpose
        });
        tokens.insert(token.value.clone(), token);
        Ok(())
    }

    async fn consume(
        &self,
        value: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<EntityId>> {
        let mut tokens = self.tokens.lock().await;
        match tokens.get_mut(value) {
            Some(token) if token.purpose == purpose && token.is_live(now) => {
                token.consumed = true;
                Ok(Some(token.subject))
            }
            _ => Ok(None),
        }
    }
}
