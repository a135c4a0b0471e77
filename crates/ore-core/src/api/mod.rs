//! REST API client module for the Ore v2 API.
//!
//! This module provides the `ApiClient` for talking to `/api/v2` with
//! cached bearer sessions, plus typed wrappers for the individual calls.
//!
//! Sessions come from `POST /api/v2/authenticate` (public) or
//! `POST /api/v2/authenticate/user` (logged-in user, cookie based).

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, AuthScheme, Body, ClientOptions};
pub use error::ApiError;
pub use transport::{FormData, FormPart, HttpRequest, HttpResponse, Payload, ReqwestTransport, Transport};
