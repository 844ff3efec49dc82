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

//! Asset balances held on an exchange.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use meridian_core::correctness::f64_to_decimal_checked;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identifiers::AssetIndex;

/// Errors raised when constructing a [`Balance`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Invalid balance: free {free} exceeds total {total}")]
    FreeExceedsTotal { total: Decimal, free: Decimal },
    #[error("Invalid balance: {0}")]
    InvalidNumber(String),
}

/// A (total, free) balance of one asset, where `free <= total` always holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BalanceRaw")]
pub struct Balance {
    total: Decimal,
    free: Decimal,
}

#[derive(Deserialize)]
struct BalanceRaw {
    total: Decimal,
    free: Decimal,
}

impl TryFrom<BalanceRaw> for Balance {
    type Error = BalanceError;

    fn try_from(raw: BalanceRaw) -> Result<Self, Self::Error> {
        Self::new_checked(raw.total, raw.free)
    }
}

impl Balance {
    /// Creates a new [`Balance`] instance with correctness checking.
    ///
    /// # Errors
    ///
    /// Returns an error if `free` exceeds `total`.
    pub fn new_checked(total: Decimal, free: Decimal) -> Result<Self, BalanceError> {
        if free > total {
            return Err(BalanceError::FreeExceedsTotal { total, free });
        }
        Ok(Self { total, free })
    }

    /// Creates a new [`Balance`] from floating point values.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is NaN or infinite, or `free` exceeds `total`.
    pub fn from_f64(total: f64, free: f64) -> Result<Self, BalanceError> {
        let total = f64_to_decimal_checked(total, "total")
            .map_err(|e| BalanceError::InvalidNumber(e.to_string()))?;
        let free = f64_to_decimal_checked(free, "free")
            .map_err(|e| BalanceError::InvalidNumber(e.to_string()))?;
        Self::new_checked(total, free)
    }

    /// Returns the total balance.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Returns the free (available) balance.
    #[must_use]
    pub const fn free(&self) -> Decimal {
        self.free
    }

    /// Returns the balance in use, `total - free`.
    #[must_use]
    pub fn used(&self) -> Decimal {
        self.total - self.free
    }
}

impl Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Balance(total={}, free={})", self.total, self.free)
    }
}

/// A point-in-time [`Balance`] snapshot of one exchange asset.
///
/// A later snapshot for the same asset supersedes an earlier one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: AssetIndex,
    pub balance: Balance,
    pub time_exchange: DateTime<Utc>,
}

impl AssetBalance {
    /// Creates a new [`AssetBalance`] instance.
    #[must_use]
    pub const fn new(asset: AssetIndex, balance: Balance, time_exchange: DateTime<Utc>) -> Self {
        Self {
            asset,
            balance,
            time_exchange,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_used_is_total_minus_free() {
        let balance = Balance::new_checked(dec!(100), dec!(40)).unwrap();
        assert_eq!(balance.used(), dec!(60));
    }

    #[rstest]
    #[case(dec!(10), dec!(10))]
    #[case(dec!(10), dec!(0))]
    #[case(dec!(0), dec!(-5))]
    fn test_valid_balances(#[case] total: Decimal, #[case] free: Decimal) {
        assert!(Balance::new_checked(total, free).is_ok());
    }

    #[rstest]
    fn test_free_exceeding_total_fails() {
        assert_eq!(
            Balance::new_checked(dec!(10), dec!(10.01)),
            Err(BalanceError::FreeExceedsTotal {
                total: dec!(10),
                free: dec!(10.01)
            })
        );
    }

    #[rstest]
    #[case(f64::NAN, 1.0)]
    #[case(1.0, f64::INFINITY)]
    fn test_from_f64_rejects_non_finite(#[case] total: f64, #[case] free: f64) {
        assert!(matches!(
            Balance::from_f64(total, free),
            Err(BalanceError::InvalidNumber(_))
        ));
    }

    #[rstest]
    fn test_deserialize_validates() {
        let ok: Balance = serde_json::from_str(r#"{"total":"10","free":"4"}"#).unwrap();
        assert_eq!(ok.used(), dec!(6));
        assert!(serde_json::from_str::<Balance>(r#"{"total":"1","free":"4"}"#).is_err());
    }

    proptest! {
        #[test]
        fn prop_balance_invariant(total in -1_000_000i64..1_000_000, free in -1_000_000i64..1_000_000) {
            let (total, free) = (Decimal::from(total), Decimal::from(free));
            match Balance::new_checked(total, free) {
                Ok(balance) => {
                    prop_assert!(free <= total);
                    prop_assert_eq!(balance.used(), total - free);
                }
                Err(_) => prop_assert!(free > total),
            }
        }
    }
}
