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

//! Fixture functions to provide stub identifiers for testing.

use rstest::fixture;

use crate::identifiers::{
    AssetIndex, ClientOrderId, ExchangeIndex, InstrumentIndex, OrderId, StrategyId, TradeId,
};

#[fixture]
pub fn client_order_id() -> ClientOrderId {
    ClientOrderId::from("O-001")
}

#[fixture]
pub fn strategy_id() -> StrategyId {
    StrategyId::from("S-001")
}

#[fixture]
pub fn order_id() -> OrderId {
    OrderId::from("EX-1001")
}

#[fixture]
pub fn trade_id() -> TradeId {
    TradeId::from("T-1")
}

#[fixture]
pub fn exchange_index() -> ExchangeIndex {
    ExchangeIndex::new(0)
}

#[fixture]
pub fn instrument_index() -> InstrumentIndex {
    InstrumentIndex::new(0)
}

#[fixture]
pub fn asset_index_quote() -> AssetIndex {
    AssetIndex::new(1)
}
