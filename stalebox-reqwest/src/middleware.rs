//! Stale-if-error middleware for reqwest-middleware.

use async_trait::async_trait;
use http::Extensions;
use http::header::{HeaderName, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use stalebox::{DEFAULT_FALLBACK_STATUS_HEADER, FallbackContext, StaleFallbackPolicy};
use tracing::debug;

use crate::request::ReplayableRequest;

/// Stale-if-error middleware for reqwest-middleware.
///
/// Sends the request down the rest of the middleware chain. If that fails or
/// returns a non-success status, the request is sent down the chain once more
/// with `Cache-Control: only-if-cached, max-stale=<bound>`, so an HTTP cache
/// middleware registered after this one can answer with a stale entry.
///
/// Requests with a streaming body cannot be replayed and pass through
/// untouched.
///
/// Each attempt runs with its own copy of the request [`Extensions`]; the
/// network attempt uses the caller's map, the cache-only attempt a snapshot
/// taken before the network attempt.
#[derive(Debug, Clone)]
pub struct StaleIfErrorMiddleware {
    policy: StaleFallbackPolicy,
    status_header: Option<HeaderName>,
}

impl StaleIfErrorMiddleware {
    /// Create a middleware applying `policy`, reporting the response source
    /// in the default status header.
    pub fn new(policy: StaleFallbackPolicy) -> Self {
        Self {
            policy,
            status_header: Some(HeaderName::from_static(DEFAULT_FALLBACK_STATUS_HEADER)),
        }
    }

    /// Create a new builder.
    pub fn builder() -> StaleIfErrorMiddlewareBuilder {
        StaleIfErrorMiddlewareBuilder::default()
    }

    /// The policy applied to every request.
    pub fn policy(&self) -> &StaleFallbackPolicy {
        &self.policy
    }
}

impl Default for StaleIfErrorMiddleware {
    fn default() -> Self {
        Self::new(StaleFallbackPolicy::default())
    }
}

/// Builder for [`StaleIfErrorMiddleware`].
#[derive(Debug, Clone)]
pub struct StaleIfErrorMiddlewareBuilder {
    policy: StaleFallbackPolicy,
    status_header: Option<HeaderName>,
}

impl Default for StaleIfErrorMiddlewareBuilder {
    fn default() -> Self {
        Self {
            policy: StaleFallbackPolicy::default(),
            status_header: Some(HeaderName::from_static(DEFAULT_FALLBACK_STATUS_HEADER)),
        }
    }
}

impl StaleIfErrorMiddlewareBuilder {
    /// Sets the fallback policy.
    pub fn policy(self, policy: StaleFallbackPolicy) -> Self {
        Self { policy, ..self }
    }

    /// Sets the header reporting which attempt produced the response.
    pub fn status_header(self, name: HeaderName) -> Self {
        Self {
            status_header: Some(name),
            ..self
        }
    }

    /// Leaves responses without a status header.
    pub fn without_status_header(self) -> Self {
        Self {
            status_header: None,
            ..self
        }
    }

    /// Builds the middleware.
    pub fn build(self) -> StaleIfErrorMiddleware {
        StaleIfErrorMiddleware {
            policy: self.policy,
            status_header: self.status_header,
        }
    }
}

#[async_trait]
impl Middleware for StaleIfErrorMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let Some(replayable) = ReplayableRequest::capture(&req) else {
            debug!(url = %req.url(), "streaming request body, skipping stale fallback");
            return next.run(req, extensions).await;
        };

        let mut snapshot = extensions.clone();
        let network_next = next.clone();

        let (result, ctx) = self
            .policy
            .resolve_with_context(
                replayable,
                move |request: ReplayableRequest| async move {
                    network_next
                        .run(request.into_request(), extensions)
                        .await
                        .map(http::Response::<reqwest::Body>::from)
                },
                move |request: ReplayableRequest| async move {
                    next.run(request.into_request(), &mut snapshot)
                        .await
                        .map(http::Response::<reqwest::Body>::from)
                },
            )
            .await;

        let mut response = result?;
        if let Some(name) = &self.status_header {
            response
                .headers_mut()
                .insert(name.clone(), status_value(&ctx));
        }
        Ok(response.into())
    }
}

fn status_value(ctx: &FallbackContext) -> HeaderValue {
    if ctx.fell_back() {
        HeaderValue::from_static("CACHE")
    } else {
        HeaderValue::from_static("NETWORK")
    }
}
