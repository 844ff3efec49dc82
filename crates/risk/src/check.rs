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

//! Exposure calculations shared by risk checks.

use meridian_model::enums::Side;
use rust_decimal::Decimal;

/// Returns the notional value `quantity * price * contract_size` in the quote asset,
/// or `None` on overflow.
#[must_use]
pub fn calculate_quote_notional(
    quantity: Decimal,
    price: Decimal,
    contract_size: Decimal,
) -> Option<Decimal> {
    quantity.checked_mul(price)?.checked_mul(contract_size)
}

/// Returns `|current - other| / |other|`, or `None` when `other` is zero.
#[must_use]
pub fn calculate_abs_percent_difference(current: Decimal, other: Decimal) -> Option<Decimal> {
    if other.is_zero() {
        return None;
    }
    (current - other).abs().checked_div(other.abs())
}

/// Returns the signed exposure of trading `quantity` contracts: positive for buys,
/// negative for sells.
#[must_use]
pub fn calculate_delta(
    instrument_delta: Decimal,
    contract_size: Decimal,
    side: Side,
    quantity: Decimal,
) -> Decimal {
    let delta = instrument_delta * contract_size * quantity.abs();
    match side {
        Side::Buy => delta,
        Side::Sell => -delta,
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
    #[case(dec!(2), dec!(100), dec!(1), Some(dec!(200)))]
    #[case(dec!(2), dec!(100), dec!(0.01), Some(dec!(2)))]
    #[case(dec!(0), dec!(100), dec!(1), Some(dec!(0)))]
    #[case(Decimal::MAX, dec!(2), dec!(1), None)]
    fn test_calculate_quote_notional(
        #[case] quantity: Decimal,
        #[case] price: Decimal,
        #[case] contract_size: Decimal,
        #[case] expected: Option<Decimal>,
    ) {
        assert_eq!(
            calculate_quote_notional(quantity, price, contract_size),
            expected
        );
    }

    #[rstest]
    #[case(dec!(110), dec!(100), Some(dec!(0.1)))]
    #[case(dec!(90), dec!(100), Some(dec!(0.1)))]
    #[case(dec!(-50), dec!(-100), Some(dec!(0.5)))]
    #[case(dec!(5), dec!(0), None)]
    fn test_calculate_abs_percent_difference(
        #[case] current: Decimal,
        #[case] other: Decimal,
        #[case] expected: Option<Decimal>,
    ) {
        assert_eq!(calculate_abs_percent_difference(current, other), expected);
    }

    #[rstest]
    #[case(Side::Buy, dec!(3), dec!(6))]
    #[case(Side::Sell, dec!(3), dec!(-6))]
    #[case(Side::Sell, dec!(-3), dec!(-6))]
    fn test_calculate_delta(#[case] side: Side, #[case] quantity: Decimal, #[case] expected: Decimal) {
        assert_eq!(calculate_delta(dec!(1), dec!(2), side, quantity), expected);
    }
}
