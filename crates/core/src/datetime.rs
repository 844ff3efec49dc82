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

//! Common time and duration functions.

use chrono::TimeDelta;
use rust_decimal::Decimal;

/// Number of milliseconds in one second.
pub const MILLISECONDS_IN_SECOND: i64 = 1_000;

/// Number of seconds in one day.
pub const SECONDS_IN_DAY: i64 = 86_400;

/// Number of nanoseconds in one second.
pub const NANOSECONDS_IN_SECOND: i64 = 1_000_000_000;

/// Returns the length of `delta` in seconds as a [`Decimal`], keeping nanosecond precision.
///
/// Returns `None` if `delta` is too large to be expressed in nanoseconds.
#[must_use]
pub fn time_delta_to_secs(delta: TimeDelta) -> Option<Decimal> {
    delta
        .num_nanoseconds()
        .map(|nanos| Decimal::from_i128_with_scale(i128::from(nanos), 9))
}

/// Returns the arithmetic mean of the given durations, or `None` if empty.
#[must_use]
pub fn mean_time_delta(deltas: &[TimeDelta]) -> Option<TimeDelta> {
    if deltas.is_empty() {
        return None;
    }
    let total_millis: i128 = deltas
        .iter()
        .map(|delta| i128::from(delta.num_milliseconds()))
        .sum();
    let count = i128::try_from(deltas.len()).ok()?;
    let mean = i64::try_from(total_millis / count).ok()?;
    Some(TimeDelta::milliseconds(mean))
}

/// Folds a new duration into a running mean of `count` durations (including the new one).
///
/// Duration arithmetic is performed at millisecond resolution.
#[must_use]
pub fn update_mean_time_delta(mean: TimeDelta, next: TimeDelta, count: u64) -> TimeDelta {
    if count == 0 {
        return mean;
    }
    let prev = i128::from(mean.num_milliseconds());
    let delta = i128::from(next.num_milliseconds()) - prev;
    let updated = prev + delta / i128::from(count);
    TimeDelta::milliseconds(i64::try_from(updated).unwrap_or(i64::MAX))
}

/// Serde support for [`TimeDelta`] as a whole number of milliseconds.
///
/// Use with `#[serde(with = "meridian_core::datetime::serde_time_delta_millis")]`.
pub mod serde_time_delta_millis {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes `delta` as milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    pub fn serialize<S>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(delta.num_milliseconds())
    }

    /// Deserializes milliseconds into a [`TimeDelta`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an integer or is out of range.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        TimeDelta::try_milliseconds(millis)
            .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {millis}ms")))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case(TimeDelta::seconds(1), dec!(1))]
    #[case(TimeDelta::milliseconds(1_500), dec!(1.5))]
    #[case(TimeDelta::days(1), dec!(86400))]
    #[case(TimeDelta::zero(), dec!(0))]
    fn test_time_delta_to_secs(#[case] delta: TimeDelta, #[case] expected: Decimal) {
        assert_eq!(time_delta_to_secs(delta), Some(expected));
    }

    #[rstest]
    fn test_mean_time_delta() {
        assert_eq!(mean_time_delta(&[]), None);
        assert_eq!(
            mean_time_delta(&[TimeDelta::days(1), TimeDelta::days(3)]),
            Some(TimeDelta::days(2))
        );
    }

    #[rstest]
    fn test_update_mean_time_delta_matches_batch_mean() {
        let deltas = [
            TimeDelta::hours(2),
            TimeDelta::hours(4),
            TimeDelta::hours(9),
        ];
        let mut mean = TimeDelta::zero();
        for (i, delta) in deltas.iter().enumerate() {
            mean = update_mean_time_delta(mean, *delta, i as u64 + 1);
        }
        assert_eq!(mean, TimeDelta::hours(5));
        assert_eq!(Some(mean), mean_time_delta(&deltas));
    }

    #[rstest]
    fn test_serde_time_delta_millis() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Wrapper {
            #[serde(with = "serde_time_delta_millis")]
            delta: TimeDelta,
        }

        let wrapper = Wrapper {
            delta: TimeDelta::milliseconds(1_500),
        };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, r#"{"delta":1500}"#);
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), wrapper);
    }
}
