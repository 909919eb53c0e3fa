//! Authenticated REST client for the IQEngine datasource API.
//!
//! Credentials are an explicit dependency: callers hand the client a
//! [`auth::TokenProvider`], and every operation attaches a bearer token
//! best-effort, falling back to unauthenticated requests when no token can be
//! obtained.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiClient, ClientError, ClientFeatures, DataSourceClient};
pub use auth::{EnvTokenProvider, StaticTokenProvider, TokenError, TokenProvider};
pub use config::ClientConfig;
