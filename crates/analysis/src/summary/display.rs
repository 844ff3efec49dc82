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

//! Human-readable table rendering of a [`TradingSummary`].

use std::fmt::Display;

use rust_decimal::Decimal;
use tabled::{Table, Tabled, settings::Style};

use super::TradingSummary;
use crate::drawdown::max::MaxDrawdown;

#[derive(Tabled)]
struct InstrumentRow {
    #[tabled(rename = "Instrument")]
    name: String,
    #[tabled(rename = "PnL")]
    pnl: String,
    #[tabled(rename = "Return")]
    pnl_return: String,
    #[tabled(rename = "Sharpe")]
    sharpe: String,
    #[tabled(rename = "Sortino")]
    sortino: String,
    #[tabled(rename = "Calmar")]
    calmar: String,
    #[tabled(rename = "Max Drawdown")]
    drawdown_max: String,
    #[tabled(rename = "Win Rate")]
    win_rate: String,
    #[tabled(rename = "Profit Factor")]
    profit_factor: String,
}

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "Asset")]
    key: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Free")]
    free: String,
    #[tabled(rename = "Max Drawdown")]
    drawdown_max: String,
}

const NONE: &str = "-";

fn fmt_value(value: Decimal) -> String {
    if value == Decimal::MAX {
        "+inf".to_string()
    } else if value == Decimal::MIN {
        "-inf".to_string()
    } else {
        value.round_dp(4).normalize().to_string()
    }
}

fn fmt_option(value: Option<Decimal>) -> String {
    value.map_or_else(|| NONE.to_string(), fmt_value)
}

fn fmt_drawdown_max(value: Option<MaxDrawdown>) -> String {
    fmt_option(value.map(|MaxDrawdown(drawdown)| drawdown.value))
}

impl Display for TradingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Trading summary {} to {} ({}s)",
            self.time_engine_start.to_rfc3339(),
            self.time_engine_end.to_rfc3339(),
            self.trading_duration().num_seconds(),
        )?;

        let instruments: Vec<InstrumentRow> = self
            .instruments
            .iter()
            .map(|(name, sheet)| InstrumentRow {
                name: name.to_string(),
                pnl: fmt_value(sheet.pnl),
                pnl_return: fmt_value(sheet.pnl_return.value),
                sharpe: fmt_value(sheet.sharpe_ratio.value),
                sortino: fmt_value(sheet.sortino_ratio.value),
                calmar: fmt_value(sheet.calmar_ratio.value),
                drawdown_max: fmt_drawdown_max(sheet.pnl_drawdown_max),
                win_rate: fmt_option(sheet.win_rate.map(|rate| rate.value)),
                profit_factor: fmt_option(sheet.profit_factor.map(|factor| factor.value)),
            })
            .collect();

        let assets: Vec<AssetRow> = self
            .assets
            .iter()
            .map(|(key, sheet)| AssetRow {
                key: key.clone(),
                total: fmt_option(sheet.balance_end.map(|balance| balance.total())),
                free: fmt_option(sheet.balance_end.map(|balance| balance.free())),
                drawdown_max: fmt_drawdown_max(sheet.drawdown_max),
            })
            .collect();

        writeln!(f, "{}", Table::new(instruments).with(Style::rounded()))?;
        write!(f, "{}", Table::new(assets).with(Style::rounded()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use meridian_model::stubs::time_plus_days;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case(Decimal::MAX, "+inf")]
    #[case(Decimal::MIN, "-inf")]
    #[case(dec!(1.234567), "1.2346")]
    #[case(dec!(2.50000), "2.5")]
    fn test_fmt_value(#[case] value: Decimal, #[case] expected: &str) {
        assert_eq!(fmt_value(value), expected);
    }

    #[rstest]
    fn test_display_empty_summary() {
        let summary = TradingSummary {
            time_engine_start: time_plus_days(0),
            time_engine_end: time_plus_days(1),
            instruments: IndexMap::new(),
            assets: IndexMap::new(),
        };

        let rendered = summary.to_string();
        assert!(rendered.starts_with(
            "Trading summary 1970-01-01T00:00:00+00:00 to 1970-01-02T00:00:00+00:00 (86400s)"
        ));
        assert!(rendered.contains("Instrument"));
        assert!(rendered.contains("Asset"));
    }
}
