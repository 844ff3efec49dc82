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

//! Win rate: the fraction of trades that were winners.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Winning trades divided by total trades, in `[0, 1]` for valid inputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRate {
    pub value: Decimal,
}

impl WinRate {
    /// Calculates `|wins| / |total|`, or `None` when `total` is zero.
    #[must_use]
    pub fn calculate(wins: Decimal, total: Decimal) -> Option<Self> {
        if total.is_zero() {
            return None;
        }
        Some(Self {
            value: wins.abs() / total.abs(),
        })
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
    #[case(dec!(0), dec!(0), None)]
    #[case(dec!(5), dec!(0), None)]
    #[case(dec!(0), dec!(4), Some(dec!(0)))]
    #[case(dec!(3), dec!(4), Some(dec!(0.75)))]
    #[case(dec!(4), dec!(4), Some(dec!(1)))]
    fn test_calculate(
        #[case] wins: Decimal,
        #[case] total: Decimal,
        #[case] expected: Option<Decimal>,
    ) {
        assert_eq!(
            WinRate::calculate(wins, total).map(|rate| rate.value),
            expected
        );
    }
}
