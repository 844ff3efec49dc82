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

//! Risk-adjusted return ratios and trade outcome metrics.
//!
//! Where a ratio's denominator is zero the result is [`Decimal::MAX`], [`Decimal::MIN`] or zero
//! by the sign of the excess return, never an error.

pub mod calmar;
pub mod profit_factor;
pub mod rate_of_return;
pub mod sharpe;
pub mod sortino;
pub mod win_rate;

use meridian_core::math::{saturating_div, saturating_mul};
use rust_decimal::Decimal;

// Re-exports
pub use self::{
    calmar::CalmarRatio, profit_factor::ProfitFactor, rate_of_return::RateOfReturn,
    sharpe::SharpeRatio, sortino::SortinoRatio, win_rate::WinRate,
};
use crate::time::TimeInterval;

/// Returns `(mean_return - risk_free_return) / denominator`, saturating on a zero denominator.
fn excess_return_ratio(
    risk_free_return: Decimal,
    mean_return: Decimal,
    denominator: Decimal,
) -> Decimal {
    saturating_div(mean_return - risk_free_return, denominator)
}

/// Scales `value` by `factor`, leaving it unchanged if no factor could be computed.
fn scale_value(value: Decimal, factor: Option<Decimal>) -> Decimal {
    factor.map_or(value, |factor| saturating_mul(value, factor))
}

/// Square-root-of-time scaling shared by the risk-adjusted ratios.
fn scale_ratio(value: Decimal, from: TimeInterval, to: TimeInterval) -> Decimal {
    scale_value(value, TimeInterval::scale_factor(from, to))
}
