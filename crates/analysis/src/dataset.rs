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

//! Streaming summary statistics of a data set.

use meridian_core::math::decimal_sqrt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::welford::{
    calculate_mean, calculate_recurrence_relation_m, calculate_sample_variance,
};

/// Count, sum, mean and dispersion of a stream of values, updated in O(1) per value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSetSummary {
    pub count: Decimal,
    pub sum: Decimal,
    pub mean: Decimal,
    pub dispersion: Dispersion,
}

impl DataSetSummary {
    /// Folds `next_value` into the summary.
    pub fn update(&mut self, next_value: Decimal) {
        self.count += Decimal::ONE;
        self.sum += next_value;

        let prev_mean = self.mean;
        self.mean = calculate_mean(prev_mean, next_value, self.count);
        self.dispersion
            .update(prev_mean, self.mean, next_value, self.count);
    }
}

/// Spread of a data set around its mean.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dispersion {
    pub range: Range,
    /// Welford's running sum of squared deviations (`M2`).
    pub recurrence_relation_m: Decimal,
    /// Sample variance.
    pub variance: Decimal,
    pub std_dev: Decimal,
}

impl Dispersion {
    fn update(&mut self, prev_mean: Decimal, new_mean: Decimal, value: Decimal, count: Decimal) {
        self.range.update(value);
        self.recurrence_relation_m =
            calculate_recurrence_relation_m(self.recurrence_relation_m, prev_mean, value, new_mean);
        self.variance = calculate_sample_variance(self.recurrence_relation_m, count);
        self.std_dev = decimal_sqrt(self.variance).unwrap_or(Decimal::ZERO);
    }
}

/// Minimum and maximum of a data set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    pub activated: bool,
    pub high: Decimal,
    pub low: Decimal,
}

impl Range {
    /// Creates a [`Range`] seeded with its first value.
    #[must_use]
    pub const fn init(first_value: Decimal) -> Self {
        Self {
            activated: true,
            high: first_value,
            low: first_value,
        }
    }

    /// Folds `new_value` into the range.
    pub fn update(&mut self, new_value: Decimal) {
        if !self.activated {
            *self = Self::init(new_value);
            return;
        }
        self.high = self.high.max(new_value);
        self.low = self.low.min(new_value);
    }

    /// Returns `high - low`.
    #[must_use]
    pub fn calculate(&self) -> Decimal {
        self.high - self.low
    }
}
