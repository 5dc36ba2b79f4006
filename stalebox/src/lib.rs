#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # stalebox
//!
//! Stale-if-error fallback for HTTP clients that sit in front of a local
//! response cache.
//!
//! When the live request fails or answers with a non-success status, the
//! request is re-issued against the cache only, allowing a cached response up
//! to a configurable age past its expiry to be served instead of the failure.
//!
//! This crate holds the protocol-agnostic decision logic:
//!
//! - [`StaleFallbackPolicy`] decides which response to return
//! - [`FallbackRequest`] derives the cache-only copy of a request
//! - [`FallbackResponse`] tells the policy whether a response is successful
//! - [`CacheDirectives`] renders and parses the `Cache-Control` directives used
//! - [`StaleConfig`] deserializes the staleness bound
//!
//! Cache storage, eviction and honouring the directives belong to the client
//! stack the policy is plugged into. See `stalebox-reqwest` and
//! `stalebox-tower` for ready-made integrations.
//!
//! ## Feature Flags
//!
//! - `metrics` - Record fallback counters through the `metrics` facade
//!

pub mod config;
pub mod context;
pub mod directive;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod request;
pub mod response;

pub use config::{MaxStale, StaleConfig, StaleUnit};
pub use context::{FallbackContext, FallbackState, NetworkOutcome, ResponseSource};
pub use directive::CacheDirectives;
pub use error::ConfigError;
pub use policy::StaleFallbackPolicy;
pub use request::FallbackRequest;
pub use response::FallbackResponse;

/// Default name of the header integrations use to report which attempt
/// produced a response.
pub const DEFAULT_FALLBACK_STATUS_HEADER: &str = "x-stale-fallback";

/// The `stalebox` prelude.
///
/// ```rust
/// use stalebox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ConfigError, FallbackRequest, FallbackResponse, StaleFallbackPolicy};
}
