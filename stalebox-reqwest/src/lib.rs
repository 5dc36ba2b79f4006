//! Stale-if-error fallback for the [`reqwest`] HTTP client.
//!
//! [`StaleIfErrorMiddleware`] plugs into a [`reqwest_middleware::ClientBuilder`]
//! ahead of an HTTP cache middleware. When the live request fails or returns a
//! non-success status, it re-sends the request with
//! `Cache-Control: only-if-cached, max-stale=<bound>` so the cache middleware
//! can answer with a stale entry.
//!
//! ```no_run
//! use reqwest_middleware::ClientBuilder;
//! use stalebox_reqwest::{StaleFallbackPolicy, StaleIfErrorMiddleware, StaleUnit};
//!
//! let policy = StaleFallbackPolicy::new(6, StaleUnit::Hours).unwrap();
//! let client = ClientBuilder::new(reqwest::Client::new())
//!     .with(StaleIfErrorMiddleware::new(policy))
//!     // .with(your_http_cache_middleware)
//!     .build();
//! # let _ = client;
//! ```
//!
//! Responses carry an `x-stale-fallback` header set to `NETWORK` or `CACHE`.
//! Rename it with [`StaleIfErrorMiddlewareBuilder::status_header`] or drop it
//! with [`StaleIfErrorMiddlewareBuilder::without_status_header`].

mod middleware;
mod request;

pub use middleware::{StaleIfErrorMiddleware, StaleIfErrorMiddlewareBuilder};

// Re-export common types
pub use stalebox::{
    CacheDirectives, DEFAULT_FALLBACK_STATUS_HEADER, StaleConfig, StaleFallbackPolicy, StaleUnit,
};
