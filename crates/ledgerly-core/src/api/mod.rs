//! REST API client module for the finance tracker backend.
//!
//! - `Gateway`: attaches the bearer credential to every request and renews
//!   it once on a 401
//! - `ApiClient`: typed methods for every backend endpoint
//! - `Transport`: the network seam, implemented by `HttpTransport`
//!
//! The backend issues JWT access/refresh pairs from `auth/login/` and
//! `auth/register/`, and renews access tokens at `auth/token/refresh/`.

pub mod client;
pub mod error;
pub mod gateway;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::Gateway;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
