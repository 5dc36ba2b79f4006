use http::HeaderName;
use stalebox::{DEFAULT_FALLBACK_STATUS_HEADER, StaleFallbackPolicy};
use tower::Layer;

use crate::service::StaleIfErrorService;

/// Tower [`Layer`] wrapping services with stale-if-error fallback.
#[derive(Debug, Clone)]
pub struct StaleIfError {
    policy: StaleFallbackPolicy,
    status_header: Option<HeaderName>,
}

impl StaleIfError {
    /// Layer applying `policy`, with the default status header.
    pub fn new(policy: StaleFallbackPolicy) -> Self {
        Self {
            policy,
            status_header: Some(HeaderName::from_static(DEFAULT_FALLBACK_STATUS_HEADER)),
        }
    }

    /// Creates a new [`StaleIfErrorBuilder`].
    pub fn builder() -> StaleIfErrorBuilder {
        StaleIfErrorBuilder::default()
    }
}

impl Default for StaleIfError {
    fn default() -> Self {
        Self::new(StaleFallbackPolicy::default())
    }
}

impl<S> Layer<S> for StaleIfError {
    type Service = StaleIfErrorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StaleIfErrorService::new(inner, self.policy, self.status_header.clone())
    }
}

/// Fluent builder for [`StaleIfError`].
#[derive(Debug, Clone)]
pub struct StaleIfErrorBuilder {
    policy: StaleFallbackPolicy,
    status_header: Option<HeaderName>,
}

impl Default for StaleIfErrorBuilder {
    fn default() -> Self {
        Self {
            policy: StaleFallbackPolicy::default(),
            status_header: Some(HeaderName::from_static(DEFAULT_FALLBACK_STATUS_HEADER)),
        }
    }
}

impl StaleIfErrorBuilder {
    /// Sets the fallback policy.
    pub fn policy(self, policy: StaleFallbackPolicy) -> Self {
        StaleIfErrorBuilder { policy, ..self }
    }

    /// Sets the header reporting which attempt produced the response.
    pub fn status_header(self, name: HeaderName) -> Self {
        StaleIfErrorBuilder {
            status_header: Some(name),
            ..self
        }
    }

    /// Leaves responses without a status header.
    pub fn without_status_header(self) -> Self {
        StaleIfErrorBuilder {
            status_header: None,
            ..self
        }
    }

    /// Builds the layer.
    pub fn build(self) -> StaleIfError {
        StaleIfError {
            policy: self.policy,
            status_header: self.status_header,
        }
    }
}
