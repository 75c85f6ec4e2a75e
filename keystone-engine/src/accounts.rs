use crate::engine::{store_failure, CommandEngine};
use crate::error::{EngineError, EngineResult};
use crate::notify::Notifier;
use keystone_credential::CredentialManager;
use keystone_model::FieldValue;
use keystone_session::SessionSigner;
use keystone_store::EntityStore;
use keystone_token::{TokenError, TokenLifecycleManager};
use keystone_types::{Credential, EntityId, TokenPurpose};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

/// The explicit credential operations: the only paths that ever write a
/// password hash.
///
/// Authentication failures are flat by design: unknown usernames run a dummy
/// hash so neither the error nor the timing separates them from a wrong
/// password.
pub struct AccountService {
    engine: Arc<CommandEngine>,
    store: Arc<dyn EntityStore>,
    tokens: Arc<TokenLifecycleManager>,
    credentials: CredentialManager,
    signer: SessionSigner,
    notifier: Arc<dyn Notifier>,
}

impl AccountService {
    /// Wires the service to its collaborators.
    ///
    /// `engine` handles the entity-creation half of registration so sign-up
    /// and `create User ...` share one code path.
    pub fn new(
        engine: Arc<CommandEngine>,
        store: Arc<dyn EntityStore>,
        tokens: Arc<TokenLifecycleManager>,
        credentials: CredentialManager,
        signer: SessionSigner,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            engine,
            store,
            tokens,
            credentials,
            signer,
            notifier,
        }
    }

    /// Registers a new user: validates the sign-up input, rejects duplicate
    /// usernames, then runs the generic create path (hash, insert,
    /// verification token, notification).
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> EngineResult<EntityId> {
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(EngineError::InvalidInput(format!(
                "username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if !email.contains('@') {
            return Err(EngineError::InvalidInput(
                "email address is not valid".to_string(),
            ));
        }

        let existing = self
            .store
            .find_by_field("User", "Username", username)
            .await
            .map_err(store_failure)?;
        if existing.is_some() {
            return Err(EngineError::Conflict("username already exists".to_string()));
        }

        let tokens = vec![
            format!("Username={username}"),
            format!("Email={email}"),
            format!("Password={password}"),
        ];
        let id = self.engine.create("User", &tokens).await?;
        info!(%id, "registered user");
        Ok(id)
    }

    /// Authenticates a user and issues a session token.
    pub async fn authenticate(&self, username: &str, password: &str) -> EngineResult<String> {
        let user = self
            .store
            .find_by_field("User", "Username", username)
            .await
            .map_err(store_failure)?;

        let (id, credential) = match user.as_ref().and_then(|u| u.id.zip(u.credential.clone())) {
            Some(found) => found,
            None => {
                // Unknown user: burn an equivalent hash so the caller cannot
                // tell this apart from a wrong password.
                debug!("authentication attempt for unknown username");
                self.dummy_verify_blocking(password.to_string()).await?;
                return Err(EngineError::InvalidCredentials);
            }
        };

        if !self
            .verify_blocking(password.to_string(), credential)
            .await?
        {
            debug!(%id, "authentication failed: wrong password");
            return Err(EngineError::InvalidCredentials);
        }

        let token = self.signer.issue(id).map_err(|e| {
            error!(cause = %e, "session issuance failed");
            EngineError::Persistence
        })?;
        info!(%id, "authenticated user");
        Ok(token)
    }

    /// Requests a password reset for an email address.
    ///
    /// Always reports success. Whether the email matched a user, and whether
    /// token issuance or delivery worked, is not observable to the caller —
    /// only the log knows.
    pub async fn request_password_reset(&self, email: &str) -> EngineResult<()> {
        let user = self
            .store
            .find_by_field("User", "Email", email)
            .await
            .map_err(store_failure)?;

        let Some(id) = user.and_then(|u| u.id) else {
            debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token = match self.tokens.issue(TokenPurpose::PasswordReset, id).await {
            Ok(token) => token,
            Err(e) => {
                warn!(%id, cause = %e, "failed to issue reset token");
                return Ok(());
            }
        };
        match self
            .notifier
            .send(
                email,
                "Password Reset",
                &format!("Your password reset token is: {token}"),
            )
            .await
        {
            Ok(()) => info!(%id, "password reset email sent"),
            Err(e) => warn!(%id, cause = %e, "failed to send reset email"),
        }
        Ok(())
    }

    /// Redeems a reset token and stores a fresh credential for its subject.
    pub async fn consume_password_reset(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> EngineResult<()> {
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let id = self.consume_token(raw_token, TokenPurpose::PasswordReset).await?;
        let mut user = self
            .store
            .fetch("User", id)
            .await
            .map_err(store_failure)?
            .ok_or(EngineError::InvalidOrExpired)?;

        user.credential = Some(self.engine.hash_blocking(new_password.to_string()).await?);
        self.store.update(&user).await.map_err(store_failure)?;
        info!(%id, "password reset completed");
        Ok(())
    }

    /// Redeems an email-verification token and marks the user verified.
    pub async fn consume_email_verification(&self, raw_token: &str) -> EngineResult<EntityId> {
        let id = self
            .consume_token(raw_token, TokenPurpose::EmailVerification)
            .await?;
        let mut user = self
            .store
            .fetch("User", id)
            .await
            .map_err(store_failure)?
            .ok_or(EngineError::InvalidOrExpired)?;

        user.set("Verified", FieldValue::Boolean(true));
        self.store.update(&user).await.map_err(store_failure)?;
        info!(%id, "email verified");
        Ok(id)
    }

    /// Changes a password after verifying the old one.
    ///
    /// The new credential always gets a new salt.
    pub async fn change_password(
        &self,
        id: EntityId,
        old_password: &str,
        new_password: &str,
    ) -> EngineResult<()> {
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = self.store.fetch("User", id).await.map_err(store_failure)?;
        let Some((mut user, credential)) = user.and_then(|u| {
            let credential = u.credential.clone()?;
            Some((u, credential))
        }) else {
            debug!(%id, "password change for unknown user");
            self.dummy_verify_blocking(old_password.to_string()).await?;
            return Err(EngineError::InvalidCredentials);
        };

        if !self
            .verify_blocking(old_password.to_string(), credential)
            .await?
        {
            debug!(%id, "password change failed: wrong old password");
            return Err(EngineError::InvalidCredentials);
        }

        user.credential = Some(self.engine.hash_blocking(new_password.to_string()).await?);
        self.store.update(&user).await.map_err(store_failure)?;
        info!(%id, "password changed");
        Ok(())
    }

    async fn consume_token(&self, raw: &str, purpose: TokenPurpose) -> EngineResult<EntityId> {
        self.tokens.consume(raw, purpose).await.map_err(|e| match e {
            TokenError::InvalidOrExpired => EngineError::InvalidOrExpired,
            TokenError::Store(cause) => store_failure(cause),
        })
    }

    async fn verify_blocking(
        &self,
        password: String,
        credential: Credential,
    ) -> EngineResult<bool> {
        let manager = self.credentials.clone();
        tokio::task::spawn_blocking(move || manager.verify(&password, &credential))
            .await
            .map_err(|e| {
                error!(cause = %e, "verification task failed");
                EngineError::Persistence
            })
    }

    async fn dummy_verify_blocking(&self, password: String) -> EngineResult<bool> {
        let manager = self.credentials.clone();
        tokio::task::spawn_blocking(move || manager.verify_dummy(&password))
            .await
            .map_err(|e| {
                error!(cause = %e, "verification task failed");
                EngineError::Persistence
            })
    }
}
