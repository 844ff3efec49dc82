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

//! Maximum drawdown of a drawdown series.

use serde::{Deserialize, Serialize};

use super::Drawdown;

/// The largest drawdown of a series.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxDrawdown(pub Drawdown);

/// Streaming maximum over drawdowns fed in chronological order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MaxDrawdownGenerator {
    pub max: Option<MaxDrawdown>,
}

impl MaxDrawdownGenerator {
    /// Creates a generator seeded with `drawdown`.
    #[must_use]
    pub const fn init(drawdown: Drawdown) -> Self {
        Self {
            max: Some(MaxDrawdown(drawdown)),
        }
    }

    /// Folds `next` into the maximum. Ties keep the earlier drawdown.
    pub fn update(&mut self, next: &Drawdown) {
        let replace = match &self.max {
            Some(MaxDrawdown(current)) => next.value > current.value,
            None => true,
        };
        if replace {
            self.max = Some(MaxDrawdown(*next));
        }
    }

    /// Returns the maximum drawdown seen so far.
    #[must_use]
    pub const fn generate(&self) -> Option<MaxDrawdown> {
        self.max
    }
}

/// Returns the drawdown with the largest value, the earliest on ties.
#[must_use]
pub fn calculate_max_drawdown(series: &[Drawdown]) -> Option<MaxDrawdown> {
    let mut generator = MaxDrawdownGenerator::default();
    for drawdown in series {
        generator.update(drawdown);
    }
    generator.generate()
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use meridian_model::stubs::time_plus_days;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::drawdown::{generate_drawdown_series, tests::curve};

    fn drawdown(value: Decimal, start: i64, end: i64) -> Drawdown {
        Drawdown {
            value,
            time_start: time_plus_days(start),
            time_end: time_plus_days(end),
        }
    }

    #[rstest]
    fn test_empty_series_has_no_max() {
        assert_eq!(calculate_max_drawdown(&[]), None);
    }

    #[rstest]
    fn test_max_of_reference_curve() {
        let series = generate_drawdown_series(&curve(&[
            dec!(100),
            dec!(110),
            dec!(90),
            dec!(115),
            dec!(105),
            dec!(95),
            dec!(120),
            dec!(118),
        ]))
        .unwrap();

        let MaxDrawdown(max) = calculate_max_drawdown(&series).unwrap();
        assert_eq!(max, series[0]);
    }

    #[rstest]
    fn test_ties_keep_earliest() {
        let series = [
            drawdown(dec!(0.1), 0, 1),
            drawdown(dec!(0.3), 2, 3),
            drawdown(dec!(0.3), 4, 5),
        ];
        assert_eq!(
            calculate_max_drawdown(&series),
            Some(MaxDrawdown(series[1]))
        );
    }

    #[rstest]
    fn test_streaming_matches_batch() {
        let series = [
            drawdown(dec!(0.2), 0, 1),
            drawdown(dec!(0.05), 2, 3),
            drawdown(dec!(0.4), 4, 5),
        ];
        let mut generator = MaxDrawdownGenerator::init(series[0]);
        generator.update(&series[1]);
        generator.update(&series[2]);
        assert_eq!(generator.generate(), calculate_max_drawdown(&series));
    }
}
