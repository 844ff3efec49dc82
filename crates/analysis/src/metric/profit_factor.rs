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

//! Profit factor: gross profit over gross loss.

use meridian_core::math::saturating_div;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gross profit divided by gross loss.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitFactor {
    pub value: Decimal,
}

impl ProfitFactor {
    /// Calculates `|profits_gross| / |losses_gross|`.
    ///
    /// Returns `None` when both are zero (no trading activity). When only one side is
    /// zero the result is [`Decimal::MAX`] (no losses) or [`Decimal::MIN`] (no profits).
    #[must_use]
    pub fn calculate(profits_gross: Decimal, losses_gross: Decimal) -> Option<Self> {
        let profits = profits_gross.abs();
        let losses = losses_gross.abs();

        let value = match (profits.is_zero(), losses.is_zero()) {
            (true, true) => return None,
            (false, true) => Decimal::MAX,
            (true, false) => Decimal::MIN,
            (false, false) => saturating_div(profits, losses),
        };

        Some(Self { value })
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
    #[case(dec!(10), dec!(0), Some(Decimal::MAX))]
    #[case(dec!(0), dec!(-10), Some(Decimal::MIN))]
    #[case(dec!(10), dec!(-5), Some(dec!(2)))]
    #[case(dec!(10), dec!(5), Some(dec!(2)))]
    #[case(dec!(3), dec!(-12), Some(dec!(0.25)))]
    fn test_calculate(
        #[case] profits: Decimal,
        #[case] losses: Decimal,
        #[case] expected: Option<Decimal>,
    ) {
        assert_eq!(
            ProfitFactor::calculate(profits, losses).map(|factor| factor.value),
            expected
        );
    }

    #[rstest]
    fn test_sentinel_serializes_losslessly() {
        let factor = ProfitFactor::calculate(dec!(1), dec!(0)).unwrap();
        let json = serde_json::to_string(&factor).unwrap();
        assert_eq!(json, r#"{"value":"79228162514264337593543950335"}"#);
        assert_eq!(serde_json::from_str::<ProfitFactor>(&json).unwrap(), factor);
    }
}
