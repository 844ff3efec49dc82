// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Time intervals used to scale statistics between observation periods.
//!
//! Risk-adjusted ratios scale with the square root of time (i.i.d. returns), while
//! first-moment statistics such as the rate of return scale linearly.

use std::{fmt::Display, str::FromStr};

use chrono::TimeDelta;
use meridian_core::{datetime::time_delta_to_secs, math::decimal_sqrt};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors raised when resolving a [`TimeInterval`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Unknown interval: '{name}'")]
    UnknownInterval { name: String },
    #[error("Invalid interval duration: must be positive, was {0}")]
    NonPositiveDuration(TimeDelta),
}

/// The basis over which a statistic is expressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimeInterval {
    Daily,
    /// A trading year of 252 days.
    Annual252,
    /// A calendar year of 365 days.
    Annual365,
    Duration(TimeDelta),
}

impl TimeInterval {
    /// Resolves an interval from its canonical name.
    ///
    /// Names are matched case-insensitively after trimming; `annual_252`, `annual(252)`,
    /// `annual-252` and `annual252` are all accepted, likewise for 365.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::UnknownInterval`] if `name` is not recognised.
    pub fn from_name(name: &str) -> Result<Self, IntervalError> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "daily" => Ok(Self::Daily),
            "annual_252" | "annual(252)" | "annual-252" | "annual252" => Ok(Self::Annual252),
            "annual_365" | "annual(365)" | "annual-365" | "annual365" => Ok(Self::Annual365),
            _ => Err(IntervalError::UnknownInterval {
                name: name.to_string(),
            }),
        }
    }

    /// Creates an explicit duration interval.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::NonPositiveDuration`] if `duration` is zero or negative.
    pub fn duration_checked(duration: TimeDelta) -> Result<Self, IntervalError> {
        if duration <= TimeDelta::zero() {
            return Err(IntervalError::NonPositiveDuration(duration));
        }
        Ok(Self::Duration(duration))
    }

    /// Returns the display name, e.g. `"Annual(252)"`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Daily => "Daily".to_string(),
            Self::Annual252 => "Annual(252)".to_string(),
            Self::Annual365 => "Annual(365)".to_string(),
            Self::Duration(duration) => {
                format!("Duration {} (minutes)", duration.num_minutes())
            }
        }
    }

    /// Returns the length of the interval.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        match self {
            Self::Daily => TimeDelta::days(1),
            Self::Annual252 => TimeDelta::days(252),
            Self::Annual365 => TimeDelta::days(365),
            Self::Duration(duration) => *duration,
        }
    }

    /// Returns the square-root-of-time factor scaling a ratio from `from` to `to`.
    ///
    /// Returns `None` if `from` has zero length (or either length is unrepresentable).
    #[must_use]
    pub fn scale_factor(from: Self, to: Self) -> Option<Decimal> {
        decimal_sqrt(Self::linear_factor(from, to)?)
    }

    /// Returns the linear factor `to / from` scaling a first-moment statistic.
    ///
    /// Returns `None` if `from` has zero length (or either length is unrepresentable).
    #[must_use]
    pub fn linear_factor(from: Self, to: Self) -> Option<Decimal> {
        let from = time_delta_to_secs(from.duration())?;
        let to = time_delta_to_secs(to.duration())?;
        to.checked_div(from)
    }
}

impl Default for TimeInterval {
    /// Returns [`TimeInterval::Annual252`].
    fn default() -> Self {
        Self::Annual252
    }
}

impl From<TimeDelta> for TimeInterval {
    fn from(value: TimeDelta) -> Self {
        Self::Duration(value)
    }
}

impl Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TimeInterval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Serialized form: the canonical name for named intervals, `{"seconds": s, "nanos": n}` otherwise.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TimeIntervalRepr {
    Name(String),
    Duration {
        seconds: i64,
        #[serde(default, skip_serializing_if = "is_zero")]
        nanos: u32,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let repr = match self {
            Self::Daily => TimeIntervalRepr::Name("daily".to_string()),
            Self::Annual252 => TimeIntervalRepr::Name("annual_252".to_string()),
            Self::Annual365 => TimeIntervalRepr::Name("annual_365".to_string()),
            Self::Duration(duration) => TimeIntervalRepr::Duration {
                seconds: duration.num_seconds(),
                nanos: duration.subsec_nanos().unsigned_abs(),
            },
        };
        repr.serialize(serializer)
    }
}

/// Deserializing accepts a zero duration, which describes an empty trading period in a
/// generated summary. Use [`TimeInterval::duration_checked`] where a scaling basis is required.
impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match TimeIntervalRepr::deserialize(deserializer)? {
            TimeIntervalRepr::Name(name) => {
                Self::from_name(&name).map_err(serde::de::Error::custom)
            }
            TimeIntervalRepr::Duration { seconds, nanos } => {
                match TimeDelta::new(seconds, nanos) {
                    Some(duration) if duration >= TimeDelta::zero() => Ok(Self::Duration(duration)),
                    _ => Err(serde::de::Error::custom(format!(
                        "invalid interval duration: {seconds}s {nanos}ns"
                    ))),
                }
            }
        }
    }
}
