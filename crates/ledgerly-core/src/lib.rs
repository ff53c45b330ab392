//! Core library for ledgerly, a personal finance tracker client.
//!
//! Provides the authenticated gateway client, the credential session store,
//! models for accounts, categories and transactions, and configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SessionEvent, SessionStore};
pub use config::Config;
