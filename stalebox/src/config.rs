//! Staleness bound configuration.
//!
//! The bound is an `amount` of some [`StaleUnit`]. Only two construction modes
//! are accepted: leave both fields unset to get the default of 28 days, or set
//! both. A document overriding just one of them is rejected.
//!
//! ```
//! use stalebox::config::{StaleConfig, StaleUnit};
//!
//! let config = StaleConfig::from_yaml("amount: 4\nunit: seconds\n").unwrap();
//! assert_eq!(config, StaleConfig::new(4, StaleUnit::Seconds));
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default staleness amount, in [`DEFAULT_STALE_UNIT`]s.
pub const DEFAULT_STALE_AMOUNT: i64 = 28;

/// Default staleness unit.
pub const DEFAULT_STALE_UNIT: StaleUnit = StaleUnit::Days;

/// Granularity of the staleness amount.
///
/// The unit has no meaning beyond converting the amount into a single
/// duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleUnit {
    /// 86 400 seconds.
    Days,
    /// 3 600 seconds.
    Hours,
    /// 60 seconds.
    Minutes,
    /// Seconds.
    Seconds,
    /// Milliseconds.
    Milliseconds,
    /// Microseconds.
    Microseconds,
    /// Nanoseconds.
    Nanoseconds,
}

impl StaleUnit {
    /// Every supported unit, coarsest first.
    pub const ALL: [StaleUnit; 7] = [
        StaleUnit::Days,
        StaleUnit::Hours,
        StaleUnit::Minutes,
        StaleUnit::Seconds,
        StaleUnit::Milliseconds,
        StaleUnit::Microseconds,
        StaleUnit::Nanoseconds,
    ];

    /// Returns the unit name as used in configuration documents.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StaleUnit::Days => "days",
            StaleUnit::Hours => "hours",
            StaleUnit::Minutes => "minutes",
            StaleUnit::Seconds => "seconds",
            StaleUnit::Milliseconds => "milliseconds",
            StaleUnit::Microseconds => "microseconds",
            StaleUnit::Nanoseconds => "nanoseconds",
        }
    }

    /// Converts `amount` of this unit into a [`Duration`], saturating on
    /// overflow.
    pub fn to_duration(self, amount: u64) -> Duration {
        match self {
            StaleUnit::Days => Duration::from_secs(amount.saturating_mul(86_400)),
            StaleUnit::Hours => Duration::from_secs(amount.saturating_mul(3_600)),
            StaleUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            StaleUnit::Seconds => Duration::from_secs(amount),
            StaleUnit::Milliseconds => Duration::from_millis(amount),
            StaleUnit::Microseconds => Duration::from_micros(amount),
            StaleUnit::Nanoseconds => Duration::from_nanos(amount),
        }
    }
}

impl fmt::Display for StaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated staleness bound: a strictly positive amount of some unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaxStale {
    amount: u64,
    unit: StaleUnit,
}

impl MaxStale {
    /// Creates a bound of `amount` `unit`s.
    ///
    /// Fails with [`ConfigError::InvalidConfiguration`] when `amount <= 0`.
    pub fn new(amount: i64, unit: StaleUnit) -> Result<Self, ConfigError> {
        if amount <= 0 {
            return Err(ConfigError::invalid(format!(
                "stale amount must be positive, got {amount} {unit}"
            )));
        }
        Ok(Self {
            amount: amount.unsigned_abs(),
            unit,
        })
    }

    /// The configured amount.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// The configured unit.
    pub fn unit(&self) -> StaleUnit {
        self.unit
    }

    /// The bound as a single duration.
    pub fn as_duration(&self) -> Duration {
        self.unit.to_duration(self.amount)
    }
}

impl Default for MaxStale {
    fn default() -> Self {
        Self {
            amount: DEFAULT_STALE_AMOUNT.unsigned_abs(),
            unit: DEFAULT_STALE_UNIT,
        }
    }
}

impl fmt::Display for MaxStale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

/// Deserializable staleness configuration.
///
/// Both fields unset means "use the default bound".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaleConfig {
    /// How many `unit`s past normal expiry a cached entry stays usable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Granularity of `amount`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<StaleUnit>,
}

impl StaleConfig {
    /// Configuration overriding both the amount and the unit.
    pub fn new(amount: i64, unit: StaleUnit) -> Self {
        Self {
            amount: Some(amount),
            unit: Some(unit),
        }
    }

    /// Parses a YAML document such as `{ amount: 2, unit: hours }`.
    ///
    /// Only the document shape is checked here; the values are validated by
    /// [`StaleConfig::into_max_stale`].
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(input).map_err(|error| ConfigError::Parse(error.to_string()))
    }

    /// Validates the configuration and returns the bound it describes.
    pub fn into_max_stale(self) -> Result<MaxStale, ConfigError> {
        match (self.amount, self.unit) {
            (None, None) => Ok(MaxStale::default()),
            (Some(amount), Some(unit)) => MaxStale::new(amount, unit),
            (Some(amount), None) => Err(ConfigError::invalid(format!(
                "stale unit is required when an amount is given (amount: {amount})"
            ))),
            (None, Some(unit)) => Err(ConfigError::invalid(format!(
                "stale amount is required when a unit is given (unit: {unit})"
            ))),
        }
    }
}

impl From<MaxStale> for StaleConfig {
    fn from(max_stale: MaxStale) -> Self {
        Self {
            amount: i64::try_from(max_stale.amount).ok(),
            unit: Some(max_stale.unit),
        }
    }
}

impl TryFrom<StaleConfig> for MaxStale {
    type Error = ConfigError;

    fn try_from(config: StaleConfig) -> Result<Self, Self::Error> {
        config.into_max_stale()
    }
}
