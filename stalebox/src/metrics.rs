//! Metrics declaration and recording.

use crate::context::NetworkOutcome;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of resolutions answered by the network attempt.
    pub static ref NETWORK_SUCCESS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "stalebox_network_success_total",
            "Total number of requests answered by a successful network attempt."
        );
        "stalebox_network_success_total"
    };
    /// Track number of cache-only fallbacks, labelled by network outcome.
    pub static ref FALLBACK_COUNTER: &'static str = {
        metrics::describe_counter!(
            "stalebox_fallback_total",
            "Total number of requests re-issued against the cache."
        );
        "stalebox_fallback_total"
    };
    /// Track number of cache-only fallbacks that raised an error.
    pub static ref FALLBACK_ERROR_COUNTER: &'static str = {
        metrics::describe_counter!(
            "stalebox_fallback_error_total",
            "Total number of cache-only attempts that failed."
        );
        "stalebox_fallback_error_total"
    };
}

/// Record a resolution answered by the network.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_network_success() {
    metrics::counter!(*NETWORK_SUCCESS_COUNTER).increment(1);
}

/// Record a fallback to the cache after `outcome`.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_fallback(outcome: NetworkOutcome) {
    metrics::counter!(*FALLBACK_COUNTER, "reason" => outcome.as_str()).increment(1);
}

/// Record a cache-only attempt that raised an error.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_fallback_error() {
    metrics::counter!(*FALLBACK_ERROR_COUNTER).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_network_success() {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_fallback(_outcome: NetworkOutcome) {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_fallback_error() {}
