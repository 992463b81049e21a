//! Collaborator API contracts and HTTP adapter.
//!
//! The storefront core consumes four remote collaborators — Auth,
//! Cart, Order/Address, and Catalog — through the async traits in
//! [`contracts`]. Transport errors never reach components raw: the
//! adapter normalizes everything into [`ApiError`], a message plus an
//! optional machine-readable code (spec'd by the collaborator as
//! `TOKEN_EXPIRED` / `TOKEN_INVALID` / `NO_TOKEN` on 401s).
//!
//! [`HttpApi`] is the production implementation: a `reqwest` client
//! with per-call bearer auth read from a [`TokenStore`], a single
//! retry for read queries, and no retry for mutations.

pub mod config;
pub mod contracts;
pub mod error;
pub mod http;
pub mod retry;
pub mod token;

pub use config::{ApiConfig, ConfigError};
pub use contracts::{AddressApi, AuthApi, CartApi, CatalogApi, LoginResponse, OrderApi};
pub use error::{ApiError, ApiErrorKind, ErrorCode};
pub use http::HttpApi;
pub use retry::RetryPolicy;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
