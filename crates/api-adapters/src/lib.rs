//! # api-adapters
//!
//! The HTTP surface of the forum service. Request schemas and metrics are
//! framework-neutral; the axum router sits behind the `web-axum` feature.

pub mod dto;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod routes;

#[cfg(feature = "web-axum")]
pub use routes::{router, AppState, RouterOptions};
