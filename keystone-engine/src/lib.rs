//! The Keystone command engine.
//!
//! Two services sit on top of the registry, stores, and credential/token
//! subsystems:
//!
//! - [`CommandEngine`] — generic create/show/update/destroy/all over any
//!   registered entity type, with all-or-nothing attribute coercion and
//!   verification-token issuance for credential-bearing entities
//! - [`AccountService`] — the explicit credential operations: registration,
//!   authentication, password reset, email verification, password change
//!
//! Both report failures as [`EngineError`] values; expected conditions
//! (not found, invalid input, bad credentials) are never panics and never
//! leak internal causes to untrusted callers.

mod accounts;
mod engine;
mod error;
mod notify;
mod view;

pub use accounts::AccountService;
pub use engine::CommandEngine;
pub use error::{EngineError, EngineResult};
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use view::EntityView;
