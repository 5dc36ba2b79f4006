use std::fmt::Debug;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{HeaderName, HeaderValue, Request, Response};
use stalebox::StaleFallbackPolicy;
use tower::{Service, ServiceExt};

/// Future returned by [`StaleIfErrorService`].
pub type ResponseFuture<ResBody, E> = BoxFuture<'static, Result<Response<ResBody>, E>>;

/// Tower service applying the stale-if-error fallback to an inner service.
///
/// The inner service is called once with the original request. If that call
/// fails or returns a non-success status, a clone of the inner service is
/// called with the cache-only copy of the request.
pub struct StaleIfErrorService<S> {
    inner: S,
    policy: StaleFallbackPolicy,
    status_header: Option<HeaderName>,
}

impl<S> StaleIfErrorService<S> {
    /// Wraps `inner`.
    pub fn new(inner: S, policy: StaleFallbackPolicy, status_header: Option<HeaderName>) -> Self {
        StaleIfErrorService {
            inner,
            policy,
            status_header,
        }
    }

    /// Returns a reference to the inner service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S> Clone for StaleIfErrorService<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            policy: self.policy,
            status_header: self.status_header.clone(),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for StaleIfErrorService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Debug + Send,
    ReqBody: Clone + Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<ResBody, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Keep the service that was polled ready for the network attempt.
        let clone = self.inner.clone();
        let mut network = std::mem::replace(&mut self.inner, clone);
        let fallback = self.inner.clone();
        let policy = self.policy;
        let status_header = self.status_header.clone();

        Box::pin(async move {
            let (result, ctx) = policy
                .resolve_with_context(
                    req,
                    move |req| network.call(req),
                    move |req| fallback.oneshot(req),
                )
                .await;

            let mut response = result?;
            if let Some(name) = status_header {
                let value = if ctx.fell_back() { "CACHE" } else { "NETWORK" };
                response
                    .headers_mut()
                    .insert(name, HeaderValue::from_static(value));
            }
            Ok(response)
        })
    }
}
