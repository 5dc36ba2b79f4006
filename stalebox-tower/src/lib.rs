//! Tower middleware integration for stale-if-error fallback.
//!
//! This crate provides [`StaleIfError`], a Tower [`Layer`] for HTTP client
//! services that sit in front of a response cache. When the wrapped service
//! fails or answers with a non-success status, the request is sent once more
//! with `Cache-Control: only-if-cached, max-stale=<bound>`, letting the cache
//! answer with an entry that expired no longer than the bound ago.
//!
//! The wrapped service, or a layer inside it, is responsible for honouring
//! those directives.
//!
//! # Quick Start
//!
//! ```
//! use stalebox_tower::{StaleFallbackPolicy, StaleIfError, StaleUnit};
//! use tower::{ServiceBuilder, service_fn};
//!
//! let policy = StaleFallbackPolicy::new(1, StaleUnit::Hours).unwrap();
//!
//! let service = ServiceBuilder::new()
//!     .layer(StaleIfError::new(policy))
//!     .service(service_fn(|_req: http::Request<String>| async {
//!         Ok::<_, std::convert::Infallible>(http::Response::new("Hello"))
//!     }));
//! # let _ = service;
//! ```
//!
//! # Response Headers
//!
//! | Header Value | Meaning |
//! |--------------|---------|
//! | `NETWORK` | The first call succeeded |
//! | `CACHE` | The response comes from the cache-only call |
//!
//! The default header name is `x-stale-fallback`. Customize it with
//! [`StaleIfErrorBuilder::status_header`].
//!
//! # Request Bodies
//!
//! The request is sent twice at most, so the body type must be `Clone`.
//! Buffer streaming bodies (for example into `Full<Bytes>`) before this layer.
//!
//! [`Layer`]: tower::Layer

#![warn(missing_docs)]

/// Tower layer and builder.
pub mod layer;
/// The Tower service performing the fallback.
pub mod service;

pub use layer::{StaleIfError, StaleIfErrorBuilder};
pub use service::{ResponseFuture, StaleIfErrorService};
pub use stalebox::{DEFAULT_FALLBACK_STATUS_HEADER, StaleConfig, StaleFallbackPolicy, StaleUnit};
