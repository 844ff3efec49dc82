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

//! Drawdown detection over an equity curve.
//!
//! A drawdown is a peak-to-trough decline, measured as a fraction of the peak, lasting from
//! the peak until the curve next meets or exceeds that peak. Only positive peaks open a
//! drawdown, and the fraction is capped at a total loss, so every value lies in `[0, 1]`.

pub mod max;
pub mod mean;

use chrono::{DateTime, TimeDelta, Utc};
use meridian_core::{Timed, correctness::check_f64_finite, math::saturating_div};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::{Deserialize, Serialize};

/// Errors raised when validating an equity curve.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DrawdownError {
    #[error("Invalid equity value at index {index}: {value} is not finite")]
    NonFinite { index: usize, value: f64 },
    #[error(
        "Invalid equity curve: timestamp at index {index} ({time}) does not follow the previous ({previous})"
    )]
    NonMonotonicTime {
        index: usize,
        previous: DateTime<Utc>,
        time: DateTime<Utc>,
    },
}

/// A peak-to-trough decline in an equity curve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawdown {
    /// Fractional loss from the peak, `(peak - trough) / peak`, capped at 1.
    pub value: Decimal,
    /// Time of the peak.
    pub time_start: DateTime<Utc>,
    /// Time of recovery, or the latest point for a drawdown still in progress.
    pub time_end: DateTime<Utc>,
}

impl Drawdown {
    /// Returns `time_end - time_start`.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.time_end - self.time_start
    }
}

/// Streaming drawdown detector over `Timed<Decimal>` equity points.
///
/// Points must be fed in chronological order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DrawdownGenerator {
    pub peak: Option<Timed<Decimal>>,
    pub drawdown_max: Option<Drawdown>,
}

impl DrawdownGenerator {
    /// Creates a generator whose peak is `point`.
    #[must_use]
    pub const fn init(point: Timed<Decimal>) -> Self {
        Self {
            peak: Some(point),
            drawdown_max: None,
        }
    }

    /// Folds `point` into the generator, returning a drawdown it ended.
    ///
    /// A point at or above the peak ends the current drawdown (if any) and becomes the new peak.
    pub fn update(&mut self, point: Timed<Decimal>) -> Option<Drawdown> {
        let Some(peak) = self.peak else {
            self.peak = Some(point);
            return None;
        };

        if point.value >= peak.value {
            let ended = self.drawdown_max.take().map(|drawdown| Drawdown {
                time_end: point.time,
                ..drawdown
            });
            self.peak = Some(point);
            return ended;
        }

        if peak.value <= Decimal::ZERO {
            return None;
        }

        let value = peak
            .value
            .checked_sub(point.value)
            .map_or(Decimal::ONE, |loss| saturating_div(loss, peak.value))
            .min(Decimal::ONE);
        self.drawdown_max = Some(match self.drawdown_max {
            Some(current) => Drawdown {
                value: current.value.max(value),
                time_end: point.time,
                ..current
            },
            None => Drawdown {
                value,
                time_start: peak.time,
                time_end: point.time,
            },
        });

        None
    }

    /// Returns the drawdown in progress, if any, without ending it.
    #[must_use]
    pub const fn current(&self) -> Option<Drawdown> {
        self.drawdown_max
    }

    /// Ends and returns the drawdown in progress, if any.
    ///
    /// Its `time_end` is the latest point seen.
    pub const fn generate(&mut self) -> Option<Drawdown> {
        self.drawdown_max.take()
    }
}

/// Returns every drawdown in `points`, including one still in progress at the final point.
///
/// Fewer than two points yield an empty series.
///
/// # Errors
///
/// Returns [`DrawdownError::NonMonotonicTime`] if timestamps are not strictly increasing.
pub fn generate_drawdown_series(
    points: &[Timed<Decimal>],
) -> Result<Vec<Drawdown>, DrawdownError> {
    check_strictly_increasing(points.iter().map(|point| point.time))?;

    if points.len() < 2 {
        return Ok(Vec::new());
    }

    let mut generator = DrawdownGenerator::default();
    let mut series: Vec<Drawdown> = points
        .iter()
        .filter_map(|point| generator.update(*point))
        .collect();
    series.extend(generator.generate());

    Ok(series)
}

/// Returns every drawdown in a curve of `f64` points, see [`generate_drawdown_series`].
///
/// # Errors
///
/// Returns an error if:
/// - Any value is NaN or infinite.
/// - Timestamps are not strictly increasing.
pub fn generate_drawdown_series_f64(
    points: &[(DateTime<Utc>, f64)],
) -> Result<Vec<Drawdown>, DrawdownError> {
    let points = points
        .iter()
        .enumerate()
        .map(|(index, (time, value))| {
            let non_finite = DrawdownError::NonFinite {
                index,
                value: *value,
            };
            check_f64_finite(*value, "value").map_err(|_| non_finite.clone())?;
            Decimal::from_f64(*value)
                .map(|value| Timed::new(value, *time))
                .ok_or(non_finite)
        })
        .collect::<Result<Vec<_>, _>>()?;

    generate_drawdown_series(&points)
}

fn check_strictly_increasing(
    times: impl Iterator<Item = DateTime<Utc>>,
) -> Result<(), DrawdownError> {
    let mut previous: Option<DateTime<Utc>> = None;
    for (index, time) in times.enumerate() {
        if let Some(previous) = previous
            && time <= previous
        {
            return Err(DrawdownError::NonMonotonicTime {
                index,
                previous,
                time,
            });
        }
        previous = Some(time);
    }
    Ok(())
}
