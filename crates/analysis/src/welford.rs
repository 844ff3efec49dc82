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

//! Welford's online algorithm for the running mean and variance of a stream of values.
//!
//! See <https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Welford's_online_algorithm>.

use rust_decimal::Decimal;

/// Folds `next_value` into the running mean of `count` values (including `next_value`).
///
/// `mean' = mean + (value - mean) / count`
#[must_use]
pub fn calculate_mean(prev_mean: Decimal, next_value: Decimal, count: Decimal) -> Decimal {
    prev_mean + (next_value - prev_mean) / count
}

/// Folds `next_value` into the running sum of squared deviations `M2`.
///
/// `M' = M + (value - prev_mean) * (value - next_mean)`
#[must_use]
pub fn calculate_recurrence_relation_m(
    prev_m: Decimal,
    prev_mean: Decimal,
    next_value: Decimal,
    next_mean: Decimal,
) -> Decimal {
    prev_m + (next_value - prev_mean) * (next_value - next_mean)
}

/// Returns the unbiased sample variance `M / (count - 1)`, or zero for fewer than two values.
#[must_use]
pub fn calculate_sample_variance(recurrence_relation_m: Decimal, count: Decimal) -> Decimal {
    if count < Decimal::TWO {
        return Decimal::ZERO;
    }
    recurrence_relation_m / (count - Decimal::ONE)
}

/// Returns the population variance `M / count`, or zero for fewer than one value.
#[must_use]
pub fn calculate_population_variance(recurrence_relation_m: Decimal, count: Decimal) -> Decimal {
    if count < Decimal::ONE {
        return Decimal::ZERO;
    }
    recurrence_relation_m / count
}
