//! Responses the fallback policy can classify.

use http::Response;

/// A response the policy can test for success.
///
/// Success is the only property the policy looks at; the body is never read.
pub trait FallbackResponse {
    /// `true` for 2xx-equivalent outcomes.
    fn is_successful(&self) -> bool;
}

impl<B> FallbackResponse for Response<B> {
    #[inline]
    fn is_successful(&self) -> bool {
        self.status().is_success()
    }
}
