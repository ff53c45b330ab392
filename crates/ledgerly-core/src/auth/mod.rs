//! Authentication module for managing the credential pair.
//!
//! This module provides:
//! - `SessionStore`: the two-value credential storage capability, with
//!   `MemoryStore`, `FileStore` and `KeyringStore` backends
//! - `Session`: route-guard check, login/logout bookkeeping and the
//!   `SessionEvent` channel the outer layer listens on

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringStore;
pub use session::{Session, SessionEvent, TokenPair};
pub use store::{CredentialKey, FileStore, MemoryStore, SessionStore};
