//! Client library for the Ore plugin repository API.
//!
//! - `api`: session-aware HTTP client and typed endpoint wrappers
//! - `auth`: sessions and the stores they are cached in
//! - `config`: persistent client configuration
//! - `models`: API entities and fixed vocabularies
//! - `utils`: formatting helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, AuthScheme, ClientOptions};
pub use auth::{Session, SessionKind, SessionStore};
pub use config::{Config, StoreKind};
