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

use std::{io::Write, sync::Arc};

use chrono::TimeDelta;
use meridian_analysis::{
    drawdown::{
        generate_drawdown_series,
        max::{MaxDrawdown, calculate_max_drawdown},
        mean::calculate_mean_drawdown,
    },
    summary::backtest::RequestCounts,
    time::TimeInterval,
};
use meridian_core::Timed;
use meridian_model::{
    balance::{AssetBalance, Balance},
    enums::Side,
    events::{AccountEvent, AccountEventKind, DataKind, EngineEvent, MarketEvent},
    identifiers::{AssetIndex, ExchangeIndex, InstrumentIndex, InstrumentName, OrderId, TradeId},
    orders::OrderKey,
    stubs::{order_key_for, order_request_open_for, time_plus_days},
    trade::Trade,
};
use meridian_risk::manager::DefaultRiskManager;
use meridian_system::{
    backtest::{BacktestArgs, ScheduledRequests, load_events_json, run_backtest, run_backtests},
    config::SystemConfig,
    engine::SummaryGenerator,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const BTC_USDT: InstrumentIndex = InstrumentIndex::new(0);
const USDT: AssetIndex = AssetIndex::new(1);
const EQUITY_CURVE: [Decimal; 8] = [
    dec!(100),
    dec!(110),
    dec!(90),
    dec!(115),
    dec!(105),
    dec!(95),
    dec!(120),
    dec!(118),
];

const CONFIG: &str = r#"
risk_free_return = "0"
interval = "daily"

[risk.global]
max_position_quantity = "5"

[[instruments]]
exchange = "BINANCE_SPOT"
name = "binance_spot-btc_usdt"
base = "btc"
quote = "usdt"
"#;

fn config() -> SystemConfig {
    SystemConfig::from_toml_str(CONFIG).unwrap()
}

fn account(kind: AccountEventKind) -> EngineEvent {
    EngineEvent::Account(AccountEvent::new(ExchangeIndex::new(0), kind))
}

fn balance_event(total: Decimal, day: i64) -> EngineEvent {
    account(AccountEventKind::BalanceSnapshot(AssetBalance::new(
        USDT,
        Balance::new_checked(total, total).unwrap(),
        time_plus_days(day),
    )))
}

fn accepted(key: OrderKey, day: i64) -> EngineEvent {
    account(AccountEventKind::OpenAccepted {
        key,
        order_id: OrderId::from(format!("EX-{}", key.cid).as_str()),
        time_exchange: time_plus_days(day),
    })
}

fn filled(key: OrderKey, side: Side, price: Decimal, quantity: Decimal, day: i64) -> EngineEvent {
    account(AccountEventKind::Trade(Trade {
        id: TradeId::from(format!("T-{}", key.cid).as_str()),
        key,
        order_id: OrderId::from(format!("EX-{}", key.cid).as_str()),
        time_exchange: time_plus_days(day),
        side,
        price,
        quantity,
        fees: Decimal::ZERO,
    }))
}

fn candle(close: Decimal, day: i64) -> EngineEvent {
    EngineEvent::Market(MarketEvent {
        time_exchange: time_plus_days(day),
        exchange: ExchangeIndex::new(0),
        instrument: BTC_USDT,
        kind: DataKind::Candle {
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(10),
        },
    })
}

#[rstest]
fn test_equity_curve_drawdowns_match_series() {
    let mut generator = SummaryGenerator::from_config(&config(), DefaultRiskManager).unwrap();
    for (day, total) in EQUITY_CURVE.into_iter().enumerate() {
        generator.ingest(&balance_event(total, day as i64)).unwrap();
    }

    let points: Vec<Timed<Decimal>> = EQUITY_CURVE
        .into_iter()
        .enumerate()
        .map(|(day, total)| Timed::new(total, time_plus_days(day as i64)))
        .collect();
    let series = generate_drawdown_series(&points).unwrap();
    let triples: Vec<_> = series
        .iter()
        .map(|d| (d.value, d.time_start, d.time_end))
        .collect();
    assert_eq!(
        triples,
        vec![
            (dec!(20) / dec!(110), time_plus_days(1), time_plus_days(3)),
            (dec!(20) / dec!(115), time_plus_days(3), time_plus_days(6)),
            (dec!(2) / dec!(120), time_plus_days(6), time_plus_days(7)),
        ]
    );

    let summary = generator.generate(None);
    let usdt = &summary.assets["BINANCE_SPOT:usdt"];

    assert_eq!(usdt.drawdown, Some(series[2]));
    assert_eq!(usdt.drawdown_max, calculate_max_drawdown(&series));
    assert_eq!(usdt.drawdown_max, Some(MaxDrawdown(series[0])));

    let mean = usdt.drawdown_mean.unwrap();
    let expected = calculate_mean_drawdown(&series).unwrap();
    assert_eq!(mean.mean_drawdown.round_dp(12), expected.mean_drawdown.round_dp(12));
    assert_eq!(mean.mean_duration, TimeDelta::days(2));
    assert_eq!(summary.trading_duration(), TimeDelta::days(7));
}

#[rstest]
#[case(None)]
#[case(Some(TimeInterval::Annual252))]
#[case(Some(TimeInterval::Annual365))]
fn test_generate_is_a_pure_read(#[case] interval: Option<TimeInterval>) {
    let mut generator = SummaryGenerator::from_config(&config(), DefaultRiskManager).unwrap();
    for (day, total) in EQUITY_CURVE.into_iter().enumerate() {
        generator.ingest(&balance_event(total, day as i64)).unwrap();
    }

    let first = serde_json::to_vec(&generator.generate(interval)).unwrap();
    let second = serde_json::to_vec(&generator.generate(interval)).unwrap();

    assert_eq!(first, second);
}

fn trading_args(id: &str) -> BacktestArgs {
    let buy = order_key_for(BTC_USDT, "O-1");
    let sell = order_key_for(BTC_USDT, "O-2");
    let events = vec![
        candle(dec!(100), 0),
        accepted(buy, 1),
        filled(buy, Side::Buy, dec!(100), dec!(2), 1),
        candle(dec!(110), 2),
        accepted(sell, 3),
        filled(sell, Side::Sell, dec!(120), dec!(2), 3),
        EngineEvent::TimeUpdate(time_plus_days(4)),
    ];
    let requests = vec![
        ScheduledRequests {
            time: time_plus_days(0),
            cancels: Vec::new(),
            opens: vec![
                order_request_open_for(buy, Side::Buy, dec!(100), dec!(2)),
                // Exceeds max_position_quantity
                order_request_open_for(order_key_for(BTC_USDT, "O-9"), Side::Buy, dec!(100), dec!(6)),
            ],
        },
        ScheduledRequests {
            time: time_plus_days(2),
            cancels: Vec::new(),
            opens: vec![order_request_open_for(sell, Side::Sell, dec!(120), dec!(2))],
        },
    ];

    BacktestArgs {
        id: id.to_string(),
        config: config(),
        events: Arc::new(events),
        requests,
    }
}

#[rstest]
fn test_backtest_round_trip() {
    let summary = run_backtest(trading_args("round-trip")).unwrap();

    assert_eq!(summary.id, "round-trip");
    assert_eq!(summary.risk_free_return, Decimal::ZERO);
    assert_eq!(
        summary.requests,
        RequestCounts {
            approved: 2,
            refused: 1,
        }
    );
    let sheet = &summary.trading_summary.instruments[&InstrumentName::from("binance_spot-btc_usdt")];
    assert_eq!(sheet.pnl, dec!(40));
    assert_eq!(sheet.win_rate.map(|rate| rate.value), Some(Decimal::ONE));
    assert_eq!(summary.trading_summary.time_engine_start, time_plus_days(0));
    assert_eq!(summary.trading_summary.time_engine_end, time_plus_days(4));
}

#[rstest]
fn test_backtest_fill_for_refused_order_fails() {
    let mut args = trading_args("refused");
    let refused = order_key_for(BTC_USDT, "O-9");
    let mut events = (*args.events).clone();
    events.insert(2, accepted(refused, 1));
    args.events = Arc::new(events);

    assert!(run_backtest(args).is_err());
}

#[tokio::test]
async fn test_backtests_from_event_file() {
    let events = trading_args("file").events;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(events.as_ref()).unwrap().as_bytes())
        .unwrap();
    let loaded = Arc::new(load_events_json(file.path()).unwrap());
    assert_eq!(loaded, events);

    let batch = ["a", "b"]
        .into_iter()
        .map(|id| BacktestArgs {
            events: Arc::clone(&loaded),
            ..trading_args(id)
        })
        .collect();
    let multi = run_backtests(batch).await.unwrap();

    assert_eq!(multi.num_backtests, 2);
    assert_eq!(
        multi.get("a").map(|s| &s.trading_summary),
        multi.get("b").map(|s| &s.trading_summary)
    );
}
