//! Error types for policy construction.

use thiserror::Error;

/// Error returned when a [`StaleFallbackPolicy`](crate::StaleFallbackPolicy)
/// cannot be built from the supplied configuration.
///
/// Failures of the attempts themselves are not represented here: a failed
/// network attempt is absorbed by the policy, and a failed cache attempt is
/// handed back to the caller in its own error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The staleness bound is not usable (non-positive amount, missing unit,
    /// or only one of amount and unit overridden).
    #[error("invalid stale configuration: {reason}")]
    InvalidConfiguration {
        /// Human readable description of the rejected value.
        reason: String,
    },

    /// The configuration document could not be deserialized.
    #[error("failed to parse stale configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
