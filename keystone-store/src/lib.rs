//! Persistence abstraction for Keystone.
//!
//! The engine consumes storage through two narrow traits:
//!
//! - [`EntityStore`] — a keyed-entity store that assigns integer ids on
//!   insert and supports fetch/update/delete/list plus a single-field
//!   equality lookup
//! - [`TokenStore`] — lifecycle token persistence whose `consume` is an
//!   atomic conditional update (mark consumed if live), so two concurrent
//!   redemption attempts of the same value can never both succeed
//!
//! The shipped [`MemoryEntityStore`] and [`MemoryTokenStore`] back the
//! console binary and the test suites; any other backend only has to honor
//! the same contracts.

mod entity_store;
mod error;
mod token_store;

pub use entity_store::{EntityStore, MemoryEntityStore};
pub use error::{StoreError, StoreResult};
pub use token_store::{MemoryTokenStore, TokenStore};
