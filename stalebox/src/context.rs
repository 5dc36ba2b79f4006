//! Per-call bookkeeping of a fallback resolution.

/// Which attempt produced the outcome returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseSource {
    /// The live network attempt succeeded.
    #[default]
    Network,
    /// The cache-only attempt produced the outcome, response or error.
    Cache,
}

impl ResponseSource {
    /// Returns the source as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
        }
    }
}

/// How the network attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkOutcome {
    /// A successful response was obtained.
    #[default]
    Success,
    /// A response was obtained but its status was not successful.
    Unsuccessful,
    /// The attempt raised an error and produced no response.
    Failed,
}

impl NetworkOutcome {
    /// Returns the outcome as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            NetworkOutcome::Success => "success",
            NetworkOutcome::Unsuccessful => "status",
            NetworkOutcome::Failed => "error",
        }
    }
}

/// States of a single resolution.
///
/// ```text
/// Start -> NetworkAttempted -> Done
///                           -> CacheAttempted -> Done
///                                             -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackState {
    /// Nothing attempted yet.
    #[default]
    Start,
    /// The network attempt has finished.
    NetworkAttempted,
    /// The cache-only attempt has been issued.
    CacheAttempted,
    /// A response is being returned.
    Done,
    /// The cache-only attempt raised an error.
    Failed,
}

impl FallbackState {
    /// Returns the state as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FallbackState::Start => "start",
            FallbackState::NetworkAttempted => "network_attempted",
            FallbackState::CacheAttempted => "cache_attempted",
            FallbackState::Done => "done",
            FallbackState::Failed => "failed",
        }
    }
}

/// Summary of a finished resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FallbackContext {
    /// Attempt that produced the returned outcome.
    pub source: ResponseSource,
    /// How the network attempt ended.
    pub network: NetworkOutcome,
    /// Terminal state reached.
    pub state: FallbackState,
}

impl FallbackContext {
    pub(crate) fn network_success() -> Self {
        Self {
            source: ResponseSource::Network,
            network: NetworkOutcome::Success,
            state: FallbackState::Done,
        }
    }

    pub(crate) fn from_cache(network: NetworkOutcome, state: FallbackState) -> Self {
        Self {
            source: ResponseSource::Cache,
            network,
            state,
        }
    }

    /// `true` if the returned outcome came from the cache-only attempt.
    #[inline]
    pub fn fell_back(&self) -> bool {
        self.source == ResponseSource::Cache
    }
}
