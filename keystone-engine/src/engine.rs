use crate::error::{EngineError, EngineResult};
use crate::notify::Notifier;
use crate::view::EntityView;
use keystone_credential::CredentialManager;
use keystone_model::{coerce, parse_attr_token, Coerced, EntityRecord, TypeRegistry, ValidationError};
use keystone_store::{EntityStore, StoreError};
use keystone_token::TokenLifecycleManager;
use keystone_types::{Credential, EntityId, TokenPurpose};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Generic entity commands over every registered type.
///
/// One logical caller drives the engine per command; the engine itself holds
/// no mutable state and suspends only at store calls.
pub struct CommandEngine {
    registry: Arc<TypeRegistry>,
    store: Arc<dyn EntityStore>,
    tokens: Arc<TokenLifecycleManager>,
    credentials: CredentialManager,
    notifier: Arc<dyn Notifier>,
}

impl CommandEngine {
    /// Wires the engine to its collaborators.
    pub fn new(
        registry: Arc<TypeRegistry>,
        store: Arc<dyn EntityStore>,
        tokens: Arc<TokenLifecycleManager>,
        credentials: CredentialManager,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            store,
            tokens,
            credentials,
            notifier,
        }
    }

    /// The registry this engine dispatches over.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Creates an entity from `key=value` attribute tokens.
    ///
    /// All tokens are parsed and coerced into a scratch record before
    /// anything touches the store; the first failure rejects the whole
    /// command and nothing is persisted. For credential-bearing entities the
    /// secret token is hashed off the async runtime, and a verification
    /// token is issued and delivered after the insert commits — a delivery
    /// failure never rolls the entity back.
    pub async fn create(&self, name: &str, tokens: &[String]) -> EngineResult<EntityId> {
        let schema = self.lookup(name)?;
        let pairs = parse_all(tokens)?;

        let mut scratch = EntityRecord::new(schema.name());
        let mut secret_raw: Option<String> = None;
        for (key, value) in pairs {
            match coerce(schema, key, value)? {
                Coerced::Value(v) => scratch.set(key, v),
                Coerced::Secret(raw) => secret_raw = Some(raw),
            }
        }

        for field in schema.fields() {
            if !field.required {
                continue;
            }
            let present = if field.is_secret() {
                secret_raw.is_some()
            } else {
                scratch.get(&field.name).is_some()
            };
            if !present {
                return Err(ValidationError::MissingRequiredField {
                    field: field.name.clone(),
                }
                .into());
            }
        }

        if let Some(raw) = secret_raw {
            scratch.credential = Some(self.hash_blocking(raw).await?);
        }

        let credential_bearing = schema.has_secret_field();
        let email = scratch
            .get("Email")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        let id = self
            .store
            .insert(scratch)
            .await
            .map_err(store_failure)?;
        info!(entity = name, %id, "created entity");

        if credential_bearing {
            self.send_verification(id, email.as_deref()).await;
        }
        Ok(id)
    }

    /// Fetches an entity and returns its secret-free projection.
    pub async fn show(&self, name: &str, id: EntityId) -> EngineResult<EntityView> {
        let schema = self.lookup(name)?;
        let record = self
            .store
            .fetch(schema.name(), id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EngineError::NotFound(format!("{name} {id}")))?;
        Ok(EntityView::project(schema, id, &record))
    }

    /// Applies attribute tokens to an existing entity, all or nothing.
    ///
    /// A token addressing a secret field is rejected outright: passwords
    /// change only through the explicit account operations, never through
    /// generic assignment. The stored credential is carried over untouched.
    pub async fn update(&self, name: &str, id: EntityId, tokens: &[String]) -> EngineResult<()> {
        let schema = self.lookup(name)?;
        let pairs = parse_all(tokens)?;

        let record = self
            .store
            .fetch(schema.name(), id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| EngineError::NotFound(format!("{name} {id}")))?;

        let mut scratch = record;
        for (key, value) in pairs {
            match coerce(schema, key, value)? {
                Coerced::Value(v) => scratch.set(key, v),
                Coerced::Secret(_) => {
                    return Err(ValidationError::SecretFieldNotAssignable {
                        field: key.to_string(),
                    }
                    .into())
                }
            }
        }

        self.store.update(&scratch).await.map_err(store_failure)?;
        info!(entity = name, %id, "updated entity");
        Ok(())
    }

    /// Deletes an entity by id.
    pub async fn destroy(&self, name: &str, id: EntityId) -> EngineResult<()> {
        let schema = self.lookup(name)?;
        let removed = self
            .store
            .delete(schema.name(), id)
            .await
            .map_err(store_failure)?;
        if !removed {
            return Err(EngineError::NotFound(format!("{name} {id}")));
        }
        info!(entity = name, %id, "destroyed entity");
        Ok(())
    }

    /// Returns projections of every instance of a type.
    ///
    /// Each call re-queries the store; there is no cached snapshot.
    pub async fn all(&self, name: &str) -> EngineResult<Vec<EntityView>> {
        let schema = self.lookup(name)?;
        let records = self
            .store
            .list(schema.name())
            .await
            .map_err(store_failure)?;
        Ok(records
            .iter()
            .filter_map(|record| {
                record
                    .id
                    .map(|id| EntityView::project(schema, id, record))
            })
            .collect())
    }

    /// Hashes a password on the blocking pool.
    pub(crate) async fn hash_blocking(&self, password: String) -> EngineResult<Credential> {
        let manager = self.credentials.clone();
        tokio::task::spawn_blocking(move || manager.hash(&password))
            .await
            .map_err(|e| {
                error!(cause = %e, "hashing task failed");
                EngineError::Persistence
            })?
            .map_err(|e| {
                error!(cause = %e, "password hashing failed");
                EngineError::Persistence
            })
    }

    fn lookup(&self, name: &str) -> EngineResult<&keystone_model::EntitySchema> {
        self.registry
            .lookup(name)
            .ok_or_else(|| EngineError::NotFound(format!("entity type {name}")))
    }

    /// Issues and delivers an email-verification token. Failures are logged
    /// and absorbed: the entity is already committed.
    async fn send_verification(&self, id: EntityId, email: Option<&str>) {
        let token = match self.tokens.issue(TokenPurpose::EmailVerification, id).await {
            Ok(token) => token,
            Err(e) => {
                warn!(%id, cause = %e, "failed to issue verification token");
                return;
            }
        };
        let Some(email) = email else {
            warn!(%id, "no email on record, skipping verification delivery");
            return;
        };
        match self
            .notifier
            .send(
                email,
                "Email Verification",
                &format!("Your verification token is: {token}"),
            )
            .await
        {
            Ok(()) => info!(%id, "verification email sent"),
            Err(e) => warn!(%id, cause = %e, "failed to send verification email"),
        }
    }
}

/// Parses every attribute token up front; any malformed token rejects the
/// whole command before coercion runs.
fn parse_all(tokens: &[String]) -> Result<Vec<(&str, &str)>, ValidationError> {
    tokens.iter().map(|t| parse_attr_token(t)).collect()
}

/// Collapses a store failure into the opaque persistence error, logging the
/// cause internally.
pub(crate) fn store_failure(err: StoreError) -> EngineError {
    error!(cause = %err, "store operation failed");
    EngineError::Persistence
}
