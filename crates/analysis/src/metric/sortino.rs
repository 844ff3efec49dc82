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

//! Sortino ratio: excess return per unit of downside volatility.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{excess_return_ratio, scale_ratio};
use crate::time::TimeInterval;

/// A Sortino ratio expressed over `interval`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortinoRatio {
    pub value: Decimal,
    pub interval: TimeInterval,
}

impl SortinoRatio {
    /// Calculates `(mean_return - risk_free_return) / std_dev_loss_returns` over `returns_period`.
    #[must_use]
    pub fn calculate(
        risk_free_return: Decimal,
        mean_return: Decimal,
        std_dev_loss_returns: Decimal,
        returns_period: TimeInterval,
    ) -> Self {
        Self {
            value: excess_return_ratio(risk_free_return, mean_return, std_dev_loss_returns),
            interval: returns_period,
        }
    }

    /// Rescales the ratio to `target` by the square root of the interval ratio.
    #[must_use]
    pub fn scale(self, target: TimeInterval) -> Self {
        Self {
            value: scale_ratio(self.value, self.interval, target),
            interval: target,
        }
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
    #[case(dec!(0.001), dec!(0.002), Decimal::MAX)]
    #[case(dec!(0.002), dec!(0.001), Decimal::MIN)]
    #[case(dec!(0.002), dec!(0.002), Decimal::ZERO)]
    fn test_zero_downside_deviation_sentinels(
        #[case] risk_free_return: Decimal,
        #[case] mean_return: Decimal,
        #[case] expected: Decimal,
    ) {
        let ratio = SortinoRatio::calculate(
            risk_free_return,
            mean_return,
            Decimal::ZERO,
            TimeInterval::Daily,
        );
        assert_eq!(ratio.value, expected);
    }

    #[rstest]
    fn test_calculate_negative_excess() {
        let ratio =
            SortinoRatio::calculate(dec!(0.002), dec!(-0.003), dec!(0.01), TimeInterval::Daily);
        assert_eq!(ratio.value, dec!(-0.5));
    }

    #[rstest]
    fn test_scale_annual_365_to_daily() {
        let ratio = SortinoRatio {
            value: dec!(3.65),
            interval: TimeInterval::Annual365,
        };
        let scaled = ratio.scale(TimeInterval::Daily);
        assert_eq!(scaled.value.round_dp(10), dec!(0.1910497317));
    }
}
