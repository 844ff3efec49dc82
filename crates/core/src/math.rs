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

//! Decimal arithmetic helpers shared by the statistics and risk crates.
//!
//! Statistics are computed with [`Decimal`] so results are reproducible across platforms.
//! Where a true infinity would be required, the helpers here saturate to [`Decimal::MAX`]
//! or [`Decimal::MIN`] instead.

use rust_decimal::{Decimal, MathematicalOps};

/// Macro for approximate equality comparison.
///
/// # Usage
///
/// ```rust
/// use meridian_core::approx_eq;
///
/// let a = 0.1 + 0.2;
/// let b = 0.3;
/// assert!(approx_eq!(f64, a, b, epsilon = 1e-10));
/// ```
#[macro_export]
macro_rules! approx_eq {
    ($type:ty, $left:expr, $right:expr, epsilon = $epsilon:expr) => {{
        let left_val: $type = $left;
        let right_val: $type = $right;
        (left_val - right_val).abs() < $epsilon
    }};
}

/// Returns the sentinel standing in for positive or negative infinity with the sign of `value`.
///
/// Zero maps to zero.
#[inline]
#[must_use]
pub fn signed_sentinel(value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        Decimal::MAX
    } else if value < Decimal::ZERO {
        Decimal::MIN
    } else {
        Decimal::ZERO
    }
}

/// Multiplies `lhs` by `rhs`, saturating to the sentinel of the product's sign on overflow.
#[inline]
#[must_use]
pub fn saturating_mul(lhs: Decimal, rhs: Decimal) -> Decimal {
    lhs.checked_mul(rhs).unwrap_or_else(|| {
        let negative = lhs.is_sign_negative() != rhs.is_sign_negative();
        if negative { Decimal::MIN } else { Decimal::MAX }
    })
}

/// Divides `numerator` by `denominator`, returning the signed sentinel of the numerator
/// when the denominator is zero or the quotient overflows.
#[inline]
#[must_use]
pub fn saturating_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return signed_sentinel(numerator);
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        let negative = numerator.is_sign_negative() != denominator.is_sign_negative();
        if negative { Decimal::MIN } else { Decimal::MAX }
    })
}

/// Returns the square root of `value`, or `None` when `value` is negative.
#[inline]
#[must_use]
pub fn decimal_sqrt(value: Decimal) -> Option<Decimal> {
    value.sqrt()
}

/// Returns the arithmetic mean of `values`, or `None` for an empty slice or on overflow.
#[must_use]
pub fn decimal_mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))?;
    sum.checked_div(Decimal::from(values.len()))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal::prelude::Signed;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case(dec!(0.5), Decimal::MAX)]
    #[case(dec!(-0.5), Decimal::MIN)]
    #[case(dec!(0), Decimal::ZERO)]
    fn test_signed_sentinel(#[case] value: Decimal, #[case] expected: Decimal) {
        assert_eq!(signed_sentinel(value), expected);
    }

    #[rstest]
    fn test_sentinel_value_is_max_96_bit_unsigned() {
        assert_eq!(
            Decimal::MAX.to_string(),
            "79228162514264337593543950335"
        );
    }

    #[rstest]
    #[case(dec!(2), dec!(3), dec!(6))]
    #[case(Decimal::MAX, dec!(2), Decimal::MAX)]
    #[case(Decimal::MAX, dec!(-2), Decimal::MIN)]
    #[case(Decimal::MIN, dec!(-2), Decimal::MAX)]
    fn test_saturating_mul(#[case] lhs: Decimal, #[case] rhs: Decimal, #[case] expected: Decimal) {
        assert_eq!(saturating_mul(lhs, rhs), expected);
    }

    #[rstest]
    #[case(dec!(1), dec!(4), dec!(0.25))]
    #[case(dec!(1), dec!(0), Decimal::MAX)]
    #[case(dec!(-1), dec!(0), Decimal::MIN)]
    #[case(dec!(0), dec!(0), Decimal::ZERO)]
    fn test_saturating_div(
        #[case] numerator: Decimal,
        #[case] denominator: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(saturating_div(numerator, denominator), expected);
    }

    #[rstest]
    fn test_decimal_sqrt() {
        assert_eq!(decimal_sqrt(dec!(4)), Some(dec!(2)));
        assert_eq!(decimal_sqrt(dec!(-4)), None);
    }

    #[rstest]
    fn test_decimal_mean() {
        assert_eq!(decimal_mean(&[]), None);
        assert_eq!(decimal_mean(&[dec!(1), dec!(2), dec!(6)]), Some(dec!(3)));
    }

    fn decimal_strategy() -> impl Strategy<Value = Decimal> {
        (any::<i64>(), 0u32..=12).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
    }

    proptest! {
        #[test]
        fn prop_saturating_ops_keep_sign(lhs in decimal_strategy(), rhs in decimal_strategy()) {
            let expected = lhs.signum() * rhs.signum();

            prop_assert_eq!(saturating_mul(lhs, rhs).signum(), expected);

            let quotient = saturating_div(lhs, rhs);
            if rhs.is_zero() {
                prop_assert_eq!(quotient, signed_sentinel(lhs));
            } else {
                // Quotients below the smallest representable value round to zero
                prop_assert!(quotient.is_zero() || quotient.signum() == expected);
            }
        }
    }
}
