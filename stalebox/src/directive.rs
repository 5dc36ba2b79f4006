//! `Cache-Control` request directives used by the fallback request.
//!
//! Only the two directives the fallback relies on are modelled:
//! `only-if-cached` (do not contact the network) and `max-stale` (accept a
//! cached entry up to N seconds past its freshness lifetime). Any other
//! directive is ignored when parsing.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::HeaderMap;
use http::header::{CACHE_CONTROL, HeaderValue};

/// Largest `max-stale` value rendered, in seconds.
///
/// Values above it are clamped, matching the delta-seconds ceiling common HTTP
/// caches accept.
pub const MAX_STALE_CEILING_SECS: u32 = i32::MAX as u32;

/// Request cache directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CacheDirectives {
    /// Serve from cache only, never from the network.
    pub only_if_cached: bool,
    /// Accept entries stale by at most this many seconds.
    pub max_stale: Option<u32>,
}

impl CacheDirectives {
    /// Directives for a cache-only request accepting entries up to
    /// `max_stale` past expiry.
    ///
    /// The bound is truncated to whole seconds, so a sub-second bound
    /// renders as `max-stale=0`.
    pub fn stale_if_error(max_stale: Duration) -> Self {
        Self {
            only_if_cached: true,
            max_stale: Some(clamp_secs(max_stale.as_secs())),
        }
    }

    /// Returns `true` if no directive is set.
    pub fn is_empty(&self) -> bool {
        !self.only_if_cached && self.max_stale.is_none()
    }

    /// Reads the directives from every `Cache-Control` value in `headers`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get_all(CACHE_CONTROL)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .fold(Self::default(), |acc, value| {
                let Ok(parsed) = value.parse::<CacheDirectives>();
                acc.merge(parsed)
            })
    }

    /// Replaces the `Cache-Control` header in `headers` with these
    /// directives, or removes it when there are none.
    pub fn apply_to(&self, headers: &mut HeaderMap) {
        headers.remove(CACHE_CONTROL);
        if let Some(value) = self.to_header_value() {
            headers.insert(CACHE_CONTROL, value);
        }
    }

    /// Renders the directives as a header value, `None` when empty.
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        if self.is_empty() {
            return None;
        }
        HeaderValue::try_from(self.to_string()).ok()
    }

    fn merge(self, other: Self) -> Self {
        Self {
            only_if_cached: self.only_if_cached || other.only_if_cached,
            max_stale: match (self.max_stale, other.max_stale) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

impl fmt::Display for CacheDirectives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if self.only_if_cached {
            f.write_str("only-if-cached")?;
            sep = ", ";
        }
        if let Some(secs) = self.max_stale {
            write!(f, "{sep}max-stale={secs}")?;
        }
        Ok(())
    }
}

impl FromStr for CacheDirectives {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut directives = Self::default();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, value) = match token.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim().trim_matches('"'))),
                None => (token, None),
            };
            if name.eq_ignore_ascii_case("only-if-cached") {
                directives.only_if_cached = true;
            } else if name.eq_ignore_ascii_case("max-stale") {
                // A bare `max-stale` accepts a response of any staleness.
                let secs = match value {
                    Some(value) => match value.parse::<u64>() {
                        Ok(secs) => clamp_secs(secs),
                        Err(_) => continue,
                    },
                    None => MAX_STALE_CEILING_SECS,
                };
                directives.max_stale = Some(secs);
            }
        }
        Ok(directives)
    }
}

fn clamp_secs(secs: u64) -> u32 {
    u32::try_from(secs)
        .unwrap_or(u32::MAX)
        .min(MAX_STALE_CEILING_SECS)
}
