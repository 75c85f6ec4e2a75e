//! Universal types for the Keystone core.
//!
//! Defines the types every other subsystem depends on:
//! - [`EntityId`] — store-assigned integer identifier for persisted entities
//! - [`TokenPurpose`] / [`LifecycleToken`] — single-use, time-bounded tokens
//! - [`Credential`] — a salted password hash attached to a user-like entity
//!
//! These form the contract between the command engine, the credential and
//! token subsystems, and the persistence layer.

mod credential;
mod ids;
mod token;

pub use credential::Credential;
pub use ids::EntityId;
pub use token::{LifecycleToken, TokenPurpose};
