//! Requests the fallback policy can re-issue against the cache.

use http::Request;

use crate::directive::CacheDirectives;

/// A request from which a cache-only copy can be derived.
///
/// The policy hands the original request to the network attempt, so the copy
/// is derived from a shared borrow beforehand. Implementations must leave
/// `self` untouched.
///
/// The copy is made on every call, including calls the network attempt
/// answers successfully, so it should be cheap. For `http::Request<B>` the
/// body is cloned: prefer reference-counted bodies such as `Bytes` or
/// `Full<Bytes>` over owned buffers.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stalebox::{CacheDirectives, FallbackRequest};
///
/// let request = http::Request::get("http://example.com/").body(()).unwrap();
/// let fallback = request.with_cache_control(&CacheDirectives::stale_if_error(
///     Duration::from_secs(60),
/// ));
///
/// assert!(request.headers().get(http::header::CACHE_CONTROL).is_none());
/// assert_eq!(
///     fallback.headers()[http::header::CACHE_CONTROL],
///     "only-if-cached, max-stale=60"
/// );
/// ```
pub trait FallbackRequest: Sized {
    /// Returns a copy of the request whose `Cache-Control` header carries
    /// exactly `directives`.
    fn with_cache_control(&self, directives: &CacheDirectives) -> Self;
}

impl<B> FallbackRequest for Request<B>
where
    B: Clone,
{
    fn with_cache_control(&self, directives: &CacheDirectives) -> Self {
        let mut request = Request::new(self.body().clone());
        *request.method_mut() = self.method().clone();
        *request.uri_mut() = self.uri().clone();
        *request.version_mut() = self.version();
        *request.headers_mut() = self.headers().clone();
        *request.extensions_mut() = self.extensions().clone();
        directives.apply_to(request.headers_mut());
        request
    }
}
