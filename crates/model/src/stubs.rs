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

//! Type stubs to facilitate testing.

use chrono::{DateTime, TimeDelta, Utc};
use rstest::fixture;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    enums::{OrderKind, Side, TimeInForce},
    identifiers::{
        AssetName, ClientOrderId, ExchangeId, ExchangeIndex, InstrumentIndex, InstrumentName,
        OrderId, StrategyId, TradeId,
    },
    instruments::{IndexedInstruments, InstrumentConfig},
    orders::{OrderKey, OrderRequestOpen, RequestOpen},
    trade::Trade,
};

/// Returns the UNIX epoch shifted by `secs` seconds.
#[must_use]
pub fn time_plus_secs(secs: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::seconds(secs)
}

/// Returns the UNIX epoch shifted by `days` days.
#[must_use]
pub fn time_plus_days(days: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::days(days)
}

/// Returns a `BINANCE_SPOT` instrument configuration with a unit contract size.
#[must_use]
pub fn instrument_config(name: &str, base: &str, quote: &str) -> InstrumentConfig {
    InstrumentConfig {
        exchange: ExchangeId::from("BINANCE_SPOT"),
        name: InstrumentName::from(name),
        base: AssetName::from(base),
        quote: AssetName::from(quote),
        contract_size: Decimal::ONE,
    }
}

/// Registry of `binance_spot-btc_usdt` (index 0) and `binance_spot-eth_usdt` (index 1).
///
/// Assets: `btc` (0), `usdt` (1), `eth` (2).
#[fixture]
pub fn indexed_instruments() -> IndexedInstruments {
    IndexedInstruments::new([
        instrument_config("binance_spot-btc_usdt", "btc", "usdt"),
        instrument_config("binance_spot-eth_usdt", "eth", "usdt"),
    ])
    .expect("valid instrument configs")
}

#[fixture]
pub fn order_key() -> OrderKey {
    order_key_for(InstrumentIndex::new(0), "O-001")
}

/// Returns an order key on exchange 0 for `instrument` and `cid`, owned by strategy `S-001`.
#[must_use]
pub fn order_key_for(instrument: InstrumentIndex, cid: &str) -> OrderKey {
    OrderKey::new(
        ExchangeIndex::new(0),
        instrument,
        StrategyId::from("S-001"),
        ClientOrderId::from(cid),
    )
}

/// Returns a request to buy 1 unit at 100 with a GTC limit order.
#[fixture]
pub fn order_request_open() -> OrderRequestOpen {
    order_request_open_for(order_key(), Side::Buy, dec!(100), dec!(1))
}

/// Returns a GTC limit order request.
#[must_use]
pub fn order_request_open_for(
    key: OrderKey,
    side: Side,
    price: Decimal,
    quantity: Decimal,
) -> OrderRequestOpen {
    OrderRequestOpen {
        key,
        request: RequestOpen {
            side,
            price,
            quantity,
            kind: OrderKind::Limit,
            time_in_force: TimeInForce::GoodUntilCancelled,
        },
    }
}

/// Returns a trade `T-1` of order `O-001` at the UNIX epoch.
#[must_use]
pub fn trade(side: Side, price: Decimal, quantity: Decimal, fees: Decimal) -> Trade {
    Trade {
        id: TradeId::from("T-1"),
        key: order_key(),
        order_id: OrderId::from("EX-1001"),
        time_exchange: DateTime::UNIX_EPOCH,
        side,
        price,
        quantity,
        fees,
    }
}
