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

//! Per-instrument tear sheets built from exited positions.

use chrono::TimeDelta;
use meridian_core::Timed;
use meridian_model::position::PositionExited;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    dataset::DataSetSummary,
    drawdown::{
        Drawdown, DrawdownGenerator,
        max::{MaxDrawdown, MaxDrawdownGenerator},
        mean::{MeanDrawdown, MeanDrawdownGenerator},
    },
    metric::{CalmarRatio, ProfitFactor, RateOfReturn, SharpeRatio, SortinoRatio, WinRate},
    time::TimeInterval,
};

/// Performance snapshot of one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TearSheet {
    /// Cumulative realised PnL net of fees.
    pub pnl: Decimal,
    pub pnl_return: RateOfReturn,
    pub sharpe_ratio: SharpeRatio,
    pub sortino_ratio: SortinoRatio,
    pub calmar_ratio: CalmarRatio,
    /// The PnL drawdown in progress, if any.
    pub pnl_drawdown: Option<Drawdown>,
    pub pnl_drawdown_mean: Option<MeanDrawdown>,
    pub pnl_drawdown_max: Option<MaxDrawdown>,
    pub win_rate: Option<WinRate>,
    pub profit_factor: Option<ProfitFactor>,
}

/// Running PnL and return statistics of exited positions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PnLReturns {
    pub pnl_raw: Decimal,
    pub profits_gross: Decimal,
    pub losses_gross: Decimal,
    pub total: DataSetSummary,
    pub losses: DataSetSummary,
}

impl PnLReturns {
    /// Folds the PnL and return of `position` into the statistics.
    ///
    /// A position with zero entry value has no defined return and only contributes its PnL.
    pub fn update(&mut self, position: &PositionExited) {
        let pnl = position.pnl_realised;
        self.pnl_raw += pnl;
        if pnl > Decimal::ZERO {
            self.profits_gross += pnl;
        } else {
            self.losses_gross += pnl;
        }

        let Some(pnl_return) = pnl.checked_div(position.value_entry_max()) else {
            log::debug!(
                "Skipping return of position in {} with zero entry value",
                position.instrument
            );
            return;
        };

        self.total.update(pnl_return);
        if pnl_return.is_sign_negative() && !pnl_return.is_zero() {
            self.losses.update(pnl_return);
        }
    }
}

/// Accumulates the statistics of one instrument's [`TearSheet`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TearSheetGenerator {
    pub pnl_returns: PnLReturns,
    pub pnl_drawdown: DrawdownGenerator,
    pub pnl_drawdown_mean: MeanDrawdownGenerator,
    pub pnl_drawdown_max: MaxDrawdownGenerator,
}

impl TearSheetGenerator {
    /// Updates the statistics with an exited position.
    pub fn update_from_position(&mut self, position: &PositionExited) {
        self.pnl_returns.update(position);

        let point = Timed::new(self.pnl_returns.pnl_raw, position.time_exit);
        if let Some(ended) = self.pnl_drawdown.update(point) {
            self.pnl_drawdown_mean.update(&ended);
            self.pnl_drawdown_max.update(&ended);
        }
    }

    /// Generates a [`TearSheet`] scaled to `interval`, where the statistics were gathered
    /// over `trading_period`.
    ///
    /// The drawdown in progress counts towards the mean and max drawdowns. A zero-length
    /// trading period cannot be rescaled, so the values are reported unscaled.
    #[must_use]
    pub fn generate(
        &self,
        risk_free_return: Decimal,
        trading_period: TimeDelta,
        interval: TimeInterval,
    ) -> TearSheet {
        let returns = &self.pnl_returns;
        let period = TimeInterval::Duration(trading_period);

        let current = self.pnl_drawdown.current();
        let mut drawdown_mean = self.pnl_drawdown_mean;
        let mut drawdown_max = self.pnl_drawdown_max;
        if let Some(current) = &current {
            drawdown_mean.update(current);
            drawdown_max.update(current);
        }
        let drawdown_max = drawdown_max.generate();
        let max_drawdown_value = drawdown_max.map_or(Decimal::ZERO, |MaxDrawdown(max)| max.value);

        let mut pnl_return = RateOfReturn::calculate(returns.total.mean, period);
        let mut sharpe_ratio = SharpeRatio::calculate(
            risk_free_return,
            returns.total.mean,
            returns.total.dispersion.std_dev,
            period,
        );
        let mut sortino_ratio = SortinoRatio::calculate(
            risk_free_return,
            returns.total.mean,
            returns.losses.dispersion.std_dev,
            period,
        );
        let mut calmar_ratio =
            CalmarRatio::calculate(risk_free_return, returns.total.mean, max_drawdown_value, period);

        if trading_period > TimeDelta::zero() {
            pnl_return = pnl_return.scale(interval);
            sharpe_ratio = sharpe_ratio.scale(interval);
            sortino_ratio = sortino_ratio.scale(interval);
            calmar_ratio = calmar_ratio.scale(interval);
        }

        TearSheet {
            pnl: returns.pnl_raw,
            pnl_return,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            pnl_drawdown: current,
            pnl_drawdown_mean: drawdown_mean.generate(),
            pnl_drawdown_max: drawdown_max,
            win_rate: WinRate::calculate(
                returns.total.count - returns.losses.count,
                returns.total.count,
            ),
            profit_factor: ProfitFactor::calculate(returns.profits_gross, returns.losses_gross),
        }
    }
}
