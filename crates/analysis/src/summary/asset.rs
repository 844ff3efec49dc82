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

//! Per-asset tear sheets built from balance snapshots.

use meridian_core::Timed;
use meridian_model::balance::{AssetBalance, Balance};
use serde::{Deserialize, Serialize};

use crate::drawdown::{
    Drawdown, DrawdownGenerator,
    max::{MaxDrawdown, MaxDrawdownGenerator},
    mean::{MeanDrawdown, MeanDrawdownGenerator},
};

/// Balance and drawdown snapshot of one exchange asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TearSheetAsset {
    pub balance_end: Option<Balance>,
    /// The drawdown of the total balance in progress, if any.
    pub drawdown: Option<Drawdown>,
    pub drawdown_mean: Option<MeanDrawdown>,
    pub drawdown_max: Option<MaxDrawdown>,
}

/// Accumulates the statistics of one asset's [`TearSheetAsset`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TearSheetAssetGenerator {
    pub balance_now: Option<Balance>,
    pub drawdown: DrawdownGenerator,
    pub drawdown_mean: MeanDrawdownGenerator,
    pub drawdown_max: MaxDrawdownGenerator,
}

impl TearSheetAssetGenerator {
    /// Updates the statistics with a balance snapshot, tracking drawdowns of `total`.
    pub fn update_from_balance(&mut self, balance: &AssetBalance) {
        self.balance_now = Some(balance.balance);

        let point = Timed::new(balance.balance.total(), balance.time_exchange);
        if let Some(ended) = self.drawdown.update(point) {
            self.drawdown_mean.update(&ended);
            self.drawdown_max.update(&ended);
        }
    }

    /// Generates a [`TearSheetAsset`]; the drawdown in progress counts towards the mean and max.
    #[must_use]
    pub fn generate(&self) -> TearSheetAsset {
        let current = self.drawdown.current();
        let mut drawdown_mean = self.drawdown_mean;
        let mut drawdown_max = self.drawdown_max;
        if let Some(current) = &current {
            drawdown_mean.update(current);
            drawdown_max.update(current);
        }

        TearSheetAsset {
            balance_end: self.balance_now,
            drawdown: current,
            drawdown_mean: drawdown_mean.generate(),
            drawdown_max: drawdown_max.generate(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use meridian_model::{identifiers::AssetIndex, stubs::time_plus_days};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn snapshot(total: Decimal, day: i64) -> AssetBalance {
        AssetBalance::new(
            AssetIndex::new(1),
            Balance::new_checked(total, total).unwrap(),
            time_plus_days(day),
        )
    }

    #[rstest]
    fn test_no_snapshots() {
        let sheet = TearSheetAssetGenerator::default().generate();
        assert_eq!(sheet.balance_end, None);
        assert_eq!(sheet.drawdown_max, None);
    }

    #[rstest]
    fn test_balance_drawdowns() {
        let mut generator = TearSheetAssetGenerator::default();
        for (day, total) in [dec!(1000), dec!(800), dec!(1100), dec!(990)].into_iter().enumerate() {
            generator.update_from_balance(&snapshot(total, day as i64));
        }

        let sheet = generator.generate();
        assert_eq!(sheet.balance_end.unwrap().total(), dec!(990));
        assert_eq!(sheet.drawdown.unwrap().value, dec!(0.1));

        let MaxDrawdown(max) = sheet.drawdown_max.unwrap();
        assert_eq!(max.value, dec!(0.2));
        assert_eq!(max.time_start, time_plus_days(0));
        assert_eq!(max.time_end, time_plus_days(2));
        assert_eq!(sheet.drawdown_mean.unwrap().mean_drawdown, dec!(0.15));

        assert_eq!(generator.generate(), sheet);
    }
}
