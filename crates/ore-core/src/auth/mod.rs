//! Session management for the Ore API.
//!
//! This module provides:
//! - `Session`, `SessionKind`: bearer tokens with a kind and an expiry
//! - `SessionStore`: the key-value capability sessions are cached in, with
//!   in-memory, file and OS keychain implementations
//!
//! Sessions are reused until 60 seconds before their declared expiry.

pub mod session;
pub mod store;

pub use session::{Session, SessionKind, PUBLIC_SESSION_KEY, USER_SESSION_KEY};
pub use store::{FileStore, KeyringStore, MemoryStore, SessionStore, StoreError};
