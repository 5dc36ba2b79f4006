//! Replayable snapshot of a reqwest request.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, Version};
use reqwest::{Body, Request, Url};
use stalebox::{CacheDirectives, FallbackRequest};

/// Everything needed to send a reqwest request again.
///
/// Built only for requests whose body is fully buffered; streaming bodies
/// cannot be replayed against the cache.
#[derive(Debug, Clone)]
pub(crate) struct ReplayableRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    version: Version,
    timeout: Option<Duration>,
    body: Option<Bytes>,
}

impl ReplayableRequest {
    /// Snapshots `request`, `None` if its body is a stream.
    pub(crate) fn capture(request: &Request) -> Option<Self> {
        let body = match request.body() {
            Some(body) => Some(Bytes::copy_from_slice(body.as_bytes()?)),
            None => None,
        };
        Some(Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            version: request.version(),
            timeout: request.timeout().copied(),
            body,
        })
    }

    pub(crate) fn into_request(self) -> Request {
        let mut request = Request::new(self.method, self.url);
        *request.headers_mut() = self.headers;
        *request.version_mut() = self.version;
        *request.timeout_mut() = self.timeout;
        *request.body_mut() = self.body.map(Body::from);
        request
    }
}

impl FallbackRequest for ReplayableRequest {
    fn with_cache_control(&self, directives: &CacheDirectives) -> Self {
        let mut request = self.clone();
        directives.apply_to(&mut request.headers);
        request
    }
}
