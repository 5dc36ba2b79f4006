//! The stale-if-error fallback policy.
//!
//! A resolution makes at most two attempts. The network attempt runs first;
//! a successful response from it is returned as is. Anything else, an error
//! or a non-successful response, is discarded without looking at the reason,
//! and the request is re-issued with `only-if-cached` and `max-stale`
//! directives. Whatever the cache-only attempt yields is final: its response
//! is returned whatever the status, and its error is returned unmodified.

use std::fmt::Debug;
use std::future::Future;

use tracing::{Instrument, Span, debug, debug_span, field, warn};

use crate::config::{MaxStale, StaleConfig, StaleUnit};
use crate::context::{FallbackContext, FallbackState, NetworkOutcome};
use crate::directive::CacheDirectives;
use crate::error::ConfigError;
use crate::metrics;
use crate::request::FallbackRequest;
use crate::response::FallbackResponse;

/// Stale-if-error fallback policy.
///
/// The policy only holds its staleness bound; it is `Copy` and can be shared
/// between any number of concurrent resolutions.
///
/// # Examples
///
/// ```
/// use stalebox::{StaleFallbackPolicy, StaleUnit};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let policy = StaleFallbackPolicy::new(4, StaleUnit::Seconds).unwrap();
/// let request = http::Request::get("http://example.com/").body(()).unwrap();
///
/// let response = policy
///     .resolve(
///         request,
///         |_req| async { Err::<http::Response<()>, _>("connection refused") },
///         |req| async move {
///             assert_eq!(
///                 req.headers()[http::header::CACHE_CONTROL],
///                 "only-if-cached, max-stale=4"
///             );
///             Ok::<_, std::io::Error>(http::Response::new(()))
///         },
///     )
///     .await
///     .unwrap();
///
/// assert!(response.status().is_success());
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaleFallbackPolicy {
    max_stale: MaxStale,
}

impl StaleFallbackPolicy {
    /// Creates a policy accepting cached entries up to `amount` `unit`s past
    /// their freshness lifetime.
    ///
    /// Fails with [`ConfigError::InvalidConfiguration`] when `amount <= 0`.
    pub fn new(amount: i64, unit: StaleUnit) -> Result<Self, ConfigError> {
        Ok(Self::from_max_stale(MaxStale::new(amount, unit)?))
    }

    /// Creates a policy from an already validated bound.
    pub fn from_max_stale(max_stale: MaxStale) -> Self {
        Self { max_stale }
    }

    /// The staleness bound.
    pub fn max_stale(&self) -> MaxStale {
        self.max_stale
    }

    /// Directives carried by the cache-only request.
    pub fn directives(&self) -> CacheDirectives {
        CacheDirectives::stale_if_error(self.max_stale.as_duration())
    }

    /// Derives the cache-only copy of `request`.
    pub fn fallback_request<Req>(&self, request: &Req) -> Req
    where
        Req: FallbackRequest,
    {
        request.with_cache_control(&self.directives())
    }

    /// Resolves `request`, falling back to a stale cached response when the
    /// network attempt does not produce a successful one.
    ///
    /// Returns the network response when it is successful, otherwise the
    /// outcome of `cached` unchanged. Errors from `network` never reach the
    /// caller.
    pub async fn resolve<Req, Res, N, NFut, NErr, C, CFut, CErr>(
        &self,
        request: Req,
        network: N,
        cached: C,
    ) -> Result<Res, CErr>
    where
        Req: FallbackRequest,
        Res: FallbackResponse,
        N: FnOnce(Req) -> NFut,
        NFut: Future<Output = Result<Res, NErr>>,
        NErr: Debug,
        C: FnOnce(Req) -> CFut,
        CFut: Future<Output = Result<Res, CErr>>,
    {
        let (result, _) = self.resolve_with_context(request, network, cached).await;
        result
    }

    /// Same as [`resolve`](Self::resolve), also returning which attempt
    /// produced the outcome.
    pub async fn resolve_with_context<Req, Res, N, NFut, NErr, C, CFut, CErr>(
        &self,
        request: Req,
        network: N,
        cached: C,
    ) -> (Result<Res, CErr>, FallbackContext)
    where
        Req: FallbackRequest,
        Res: FallbackResponse,
        N: FnOnce(Req) -> NFut,
        NFut: Future<Output = Result<Res, NErr>>,
        NErr: Debug,
        C: FnOnce(Req) -> CFut,
        CFut: Future<Output = Result<Res, CErr>>,
    {
        let directives = self.directives();
        let span = debug_span!(
            "stale_fallback.resolve",
            max_stale_secs = directives.max_stale.unwrap_or_default(),
            state = field::Empty,
            source = field::Empty,
        );

        async move {
            // The network attempt takes the request by value.
            let fallback_request = self.fallback_request(&request);

            let network_outcome = match network(request).await {
                Ok(response) if response.is_successful() => {
                    metrics::record_network_success();
                    return (Ok(response), finish(FallbackContext::network_success()));
                }
                Ok(_) => NetworkOutcome::Unsuccessful,
                Err(error) => {
                    debug!(?error, "network attempt failed");
                    NetworkOutcome::Failed
                }
            };
            record_state(FallbackState::NetworkAttempted);
            debug!(
                reason = network_outcome.as_str(),
                %directives,
                "falling back to cached response"
            );
            metrics::record_fallback(network_outcome);

            record_state(FallbackState::CacheAttempted);
            let result = cached(fallback_request).await;

            let state = match &result {
                Ok(_) => FallbackState::Done,
                Err(_) => {
                    warn!("cache-only attempt failed, no fallback left");
                    metrics::record_fallback_error();
                    FallbackState::Failed
                }
            };
            (result, finish(FallbackContext::from_cache(network_outcome, state)))
        }
        .instrument(span)
        .await
    }
}

impl TryFrom<StaleConfig> for StaleFallbackPolicy {
    type Error = ConfigError;

    fn try_from(config: StaleConfig) -> Result<Self, Self::Error> {
        Ok(Self::from_max_stale(config.into_max_stale()?))
    }
}

fn record_state(state: FallbackState) {
    Span::current().record("state", state.as_str());
}

fn finish(ctx: FallbackContext) -> FallbackContext {
    record_state(ctx.state);
    Span::current().record("source", ctx.source.as_str());
    ctx
}
