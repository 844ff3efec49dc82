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

//! Historic backtests: synchronous replay of a recorded event sequence, run in parallel batches.

use std::{
    fs::File,
    io::BufReader,
    path::Path,
    sync::Arc,
    time::Instant,
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use meridian_analysis::summary::backtest::{
    BacktestSummary, MultiBacktestSummary, RequestCounts,
};
use meridian_model::{
    events::EngineEvent,
    orders::{OrderRequestCancel, OrderRequestOpen},
};
use meridian_risk::{limits::LimitsRiskManager, manager::RiskManager};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::{
    config::SystemConfig, engine::SummaryGenerator, error::EngineError, state::EngineState,
};

/// A batch of order requests submitted once engine time reaches `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRequests {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub cancels: Vec<OrderRequestCancel>,
    #[serde(default)]
    pub opens: Vec<OrderRequestOpen>,
}

/// Inputs of one backtest.
///
/// The event sequence sits behind an [`Arc`] so parameter variations can share it.
#[derive(Debug, Clone)]
pub struct BacktestArgs {
    pub id: String,
    pub config: SystemConfig,
    pub events: Arc<Vec<EngineEvent>>,
    /// Request batches, in chronological order.
    pub requests: Vec<ScheduledRequests>,
}

/// Replays `args.events` against a fresh [`SummaryGenerator`] and summarises the result.
///
/// Each request batch is submitted just before the first event at or after its time. Batches
/// scheduled after the final event are submitted at the end of the replay.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any event is rejected by the engine.
pub fn run_backtest(args: BacktestArgs) -> Result<BacktestSummary, EngineError> {
    let BacktestArgs {
        id,
        config,
        events,
        requests,
    } = args;

    let risk = LimitsRiskManager::new(config.risk.clone());
    let mut generator = SummaryGenerator::from_config(&config, risk)?;
    let mut requests = requests.into_iter().peekable();
    let mut counts = RequestCounts::default();

    for event in events.iter() {
        let time = event.time_exchange();
        while let Some(batch) = requests.next_if(|batch| batch.time <= time) {
            submit_batch(&mut generator, batch, &mut counts);
        }
        generator.ingest(event)?;
    }
    for batch in requests {
        submit_batch(&mut generator, batch, &mut counts);
    }

    log::info!(
        "Backtest {id} replayed {} events, {} requests approved, {} refused",
        events.len(),
        counts.approved,
        counts.refused
    );

    Ok(BacktestSummary {
        id,
        risk_free_return: generator.risk_free_return(),
        requests: counts,
        trading_summary: generator.generate(None),
    })
}

fn submit_batch<R: RiskManager<EngineState>>(
    generator: &mut SummaryGenerator<R>,
    batch: ScheduledRequests,
    counts: &mut RequestCounts,
) {
    generator.update_time_now(batch.time);
    let output = generator.submit_requests(batch.cancels, batch.opens);
    let refused = output.num_refused();
    counts.add(output.len() - refused, refused);
}

/// Runs every backtest on the blocking thread pool, returning summaries in input order.
///
/// # Errors
///
/// Returns an error if any backtest fails or its task panics.
pub async fn run_backtests(args: Vec<BacktestArgs>) -> anyhow::Result<MultiBacktestSummary> {
    let start = Instant::now();
    let num_backtests = args.len();

    let mut tasks = JoinSet::new();
    for (index, args) in args.into_iter().enumerate() {
        tasks.spawn_blocking(move || {
            let id = args.id.clone();
            (index, id, run_backtest(args))
        });
    }

    let mut summaries = Vec::with_capacity(num_backtests);
    while let Some(joined) = tasks.join_next().await {
        let (index, id, result) = joined.context("Backtest task failed to complete")?;
        let summary = result.with_context(|| format!("Backtest {id} failed"))?;
        summaries.push((index, summary));
    }
    summaries.sort_unstable_by_key(|(index, _)| *index);

    let duration = start.elapsed();
    log::info!("Ran {num_backtests} backtests in {duration:?}");

    Ok(MultiBacktestSummary::new(
        duration,
        summaries.into_iter().map(|(_, summary)| summary).collect(),
    ))
}

/// Reads a JSON array of [`EngineEvent`]s.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not hold valid events.
pub fn load_events_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<EngineEvent>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open events file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse events file {}", path.display()))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::io::Write;

    use meridian_model::{
        balance::{AssetBalance, Balance},
        events::{AccountEvent, AccountEventKind},
        identifiers::{AssetIndex, ExchangeIndex},
        stubs::time_plus_days,
    };
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    const CONFIG: &str = r#"{
        "instruments": [
            {"exchange": "BINANCE_SPOT", "name": "binance_spot-btc_usdt", "base": "btc", "quote": "usdt"}
        ]
    }"#;

    fn balance_event(total: Decimal, day: i64) -> EngineEvent {
        EngineEvent::Account(AccountEvent::new(
            ExchangeIndex::new(0),
            AccountEventKind::BalanceSnapshot(AssetBalance::new(
                AssetIndex::new(1),
                Balance::new_checked(total, total).unwrap(),
                time_plus_days(day),
            )),
        ))
    }

    fn args(id: &str, events: Arc<Vec<EngineEvent>>) -> BacktestArgs {
        BacktestArgs {
            id: id.to_string(),
            config: SystemConfig::from_json_str(CONFIG).unwrap(),
            events,
            requests: Vec::new(),
        }
    }

    #[rstest]
    fn test_run_backtest_summarises_balances() {
        let events = Arc::new(vec![balance_event(dec!(100), 0), balance_event(dec!(90), 1)]);

        let summary = run_backtest(args("a", events)).unwrap();

        assert_eq!(summary.id, "a");
        assert_eq!(summary.requests, RequestCounts::default());
        let usdt = &summary.trading_summary.assets["BINANCE_SPOT:usdt"];
        assert_eq!(usdt.drawdown.map(|d| d.value), Some(dec!(0.1)));
        assert_eq!(summary.trading_summary.time_engine_end, time_plus_days(1));
    }

    #[rstest]
    fn test_run_backtest_propagates_engine_errors() {
        let events = Arc::new(vec![EngineEvent::Account(AccountEvent::new(
            ExchangeIndex::new(0),
            AccountEventKind::BalanceSnapshot(AssetBalance::new(
                AssetIndex::new(7),
                Balance::default(),
                time_plus_days(0),
            )),
        ))]);

        assert!(matches!(
            run_backtest(args("bad", events)),
            Err(EngineError::UnknownAsset(_))
        ));
    }

    #[tokio::test]
    async fn test_run_backtests_preserves_order() {
        let events = Arc::new(vec![balance_event(dec!(100), 0), balance_event(dec!(80), 2)]);
        let batch = ["x", "y", "z"]
            .into_iter()
            .map(|id| args(id, Arc::clone(&events)))
            .collect();

        let multi = run_backtests(batch).await.unwrap();

        assert_eq!(multi.num_backtests, 3);
        let ids: Vec<&str> = multi.summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["x", "y", "z"]);
        assert_eq!(multi.summaries[0], {
            let mut expected = multi.summaries[2].clone();
            expected.id = "x".to_string();
            expected
        });
    }

    #[rstest]
    fn test_load_events_json() {
        let events = vec![balance_event(dec!(100), 0), EngineEvent::TimeUpdate(time_plus_days(1))];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&events).unwrap().as_bytes())
            .unwrap();

        assert_eq!(load_events_json(file.path()).unwrap(), events);
        assert!(load_events_json(file.path().with_extension("missing")).is_err());
    }
}
