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

//! Mean drawdown value and duration of a drawdown series.

use chrono::TimeDelta;
use meridian_core::{
    datetime::{mean_time_delta, update_mean_time_delta},
    math::decimal_mean,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Drawdown;
use crate::welford::calculate_mean;

/// Mean value and duration of a drawdown series.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeanDrawdown {
    pub mean_drawdown: Decimal,
    #[serde(with = "meridian_core::datetime::serde_time_delta_millis")]
    pub mean_duration: TimeDelta,
}

/// Streaming mean over drawdowns.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MeanDrawdownGenerator {
    pub count: u64,
    pub mean: Option<MeanDrawdown>,
}

impl MeanDrawdownGenerator {
    /// Creates a generator seeded with `drawdown`.
    #[must_use]
    pub fn init(drawdown: &Drawdown) -> Self {
        Self {
            count: 1,
            mean: Some(MeanDrawdown {
                mean_drawdown: drawdown.value,
                mean_duration: drawdown.duration(),
            }),
        }
    }

    /// Folds `next` into the means.
    pub fn update(&mut self, next: &Drawdown) {
        let Some(mean) = &mut self.mean else {
            *self = Self::init(next);
            return;
        };

        self.count += 1;
        mean.mean_drawdown =
            calculate_mean(mean.mean_drawdown, next.value, Decimal::from(self.count));
        mean.mean_duration =
            update_mean_time_delta(mean.mean_duration, next.duration(), self.count);
    }

    /// Returns the means of the drawdowns seen so far.
    #[must_use]
    pub const fn generate(&self) -> Option<MeanDrawdown> {
        self.mean
    }
}

/// Returns the arithmetic means of drawdown values and durations, or `None` for an empty series.
#[must_use]
pub fn calculate_mean_drawdown(series: &[Drawdown]) -> Option<MeanDrawdown> {
    let values: Vec<Decimal> = series.iter().map(|drawdown| drawdown.value).collect();
    let durations: Vec<TimeDelta> = series.iter().map(Drawdown::duration).collect();

    Some(MeanDrawdown {
        mean_drawdown: decimal_mean(&values)?,
        mean_duration: mean_time_delta(&durations)?,
    })
}
