use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use keystone_model::EntityRecord;
use keystone_types::EntityId;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// A keyed-entity store.
///
/// The store owns the canonical copy of every saved record and assigns ids
/// on insert. Operations may block or suspend; the engine awaits each call.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Persists a new record and returns the id the store assigned.
    async fn insert(&self, record: EntityRecord) -> StoreResult<EntityId>;

    /// Fetches a record by type and id. `None` if absent.
    async fn fetch(&self, entity_type: &str, id: EntityId) -> StoreResult<Option<EntityRecord>>;

    /// Replaces a previously saved record. The record must carry its id.
    async fn update(&self, record: &EntityRecord) -> StoreResult<()>;

    /// Deletes a record. Returns false if it did not exist.
    async fn delete(&self, entity_type: &str, id: EntityId) -> StoreResult<bool>;

    /// Returns every record of the given type, freshly queried per call.
    async fn list(&self, entity_type: &str) -> StoreResult<Vec<EntityRecord>>;

    /// Finds the first record whose string field equals `value`.
    async fn find_by_field(
        &self,
        entity_type: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<EntityRecord>>;
}

#[derive(Default)]
struct EntityRows {
    next_id: i64,
    rows: BTreeMap<(String, i64), EntityRecord>,
}

/// In-memory [`EntityStore`] with sequential id assignment starting at 1.
#[derive(Default)]
pub struct MemoryEntityStore {
    inner: Mutex<EntityRows>,
}

impl MemoryEntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of saved records across all types. Test observability.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    /// Returns true if no records are saved.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn insert(&self, mut record: EntityRecord) -> StoreResult<EntityId> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = EntityId::new(inner.next_id);
        record.id = Some(id);
        inner
            .rows
            .insert((record.entity_type.clone(), id.as_i64()), record);
        Ok(id)
    }

    async fn fetch(&self, entity_type: &str, id: EntityId) -> StoreResult<Option<EntityRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .get(&(entity_type.to_string(), id.as_i64()))
            .cloned())
    }

    async fn update(&self, record: &EntityRecord) -> StoreResult<()> {
        let id = record
            .id
            .ok_or_else(|| StoreError::Backend("update of an unsaved record".into()))?;
        let mut inner = self.inner.lock().await;
        let key = (record.entity_type.clone(), id.as_i64());
        if !inner.rows.contains_key(&key) {
            return Err(StoreError::NotFound(format!(
                "{} {}",
                record.entity_type, id
            )));
        }
        inner.rows.insert(key, record.clone());
        Ok(())
    }

    async fn delete(&self, entity_type: &str, id: EntityId) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .rows
            .remove(&(entity_type.to_string(), id.as_i64()))
            .is_some())
    }

    async fn list(&self, entity_type: &str) -> StoreResult<Vec<EntityRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .range((entity_type.to_string(), i64::MIN)..=(entity_type.to_string(), i64::MAX))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn find_by_field(
        &self,
        entity_type: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<EntityRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .range((entity_type.to_string(), i64::MIN)..=(entity_type.to_string(), i64::MAX))
            .map(|(_, record)| record)
            .find(|record| {
                record
                    .get(field)
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| s == value)
            })
            .cloned())
    }
}
