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

//! Summaries of historic backtest runs.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradingSummary;

/// How many order requests the risk checks approved and refused during a backtest.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
    pub approved: usize,
    pub refused: usize,
}

impl RequestCounts {
    /// Adds the outcome of one submitted batch.
    pub const fn add(&mut self, approved: usize, refused: usize) {
        self.approved += approved;
        self.refused += refused;
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.approved + self.refused
    }
}

/// The result of one backtest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub id: String,
    pub risk_free_return: Decimal,
    #[serde(default)]
    pub requests: RequestCounts,
    pub trading_summary: TradingSummary,
}

/// The results of a batch of backtests, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiBacktestSummary {
    pub num_backtests: usize,
    /// Wall-clock time taken to run the whole batch.
    pub duration: Duration,
    pub summaries: Vec<BacktestSummary>,
}

impl MultiBacktestSummary {
    /// Creates a new [`MultiBacktestSummary`] instance.
    #[must_use]
    pub fn new(duration: Duration, summaries: Vec<BacktestSummary>) -> Self {
        Self {
            num_backtests: summaries.len(),
            duration,
            summaries,
        }
    }

    /// Returns the summary of backtest `id`, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BacktestSummary> {
        self.summaries.iter().find(|summary| summary.id == id)
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

    fn summary(id: &str) -> BacktestSummary {
        BacktestSummary {
            id: id.to_string(),
            risk_free_return: dec!(0.0001),
            requests: RequestCounts {
                approved: 3,
                refused: 1,
            },
            trading_summary: TradingSummary {
                time_engine_start: time_plus_days(0),
                time_engine_end: time_plus_days(2),
                instruments: IndexMap::new(),
                assets: IndexMap::new(),
            },
        }
    }

    #[rstest]
    fn test_new_counts_summaries() {
        let multi = MultiBacktestSummary::new(
            Duration::from_millis(250),
            vec![summary("a"), summary("b")],
        );
        assert_eq!(multi.num_backtests, 2);
        assert_eq!(multi.get("b").unwrap().id, "b");
        assert_eq!(multi.get("b").unwrap().requests.total(), 4);
        assert!(multi.get("c").is_none());
    }

    #[rstest]
    fn test_serde_round_trip() {
        let multi = MultiBacktestSummary::new(Duration::from_secs(1), vec![summary("a")]);
        let json = serde_json::to_string(&multi).unwrap();
        assert_eq!(
            serde_json::from_str::<MultiBacktestSummary>(&json).unwrap(),
            multi
        );
    }
}
