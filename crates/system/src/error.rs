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

use meridian_model::{
    enums::Side,
    identifiers::{AssetIndex, ClientOrderId, InstrumentIndex, TradeId},
    instruments::InstrumentError,
    orders::{OrderError, OrderKey},
};

use crate::config::ConfigError;

/// Errors raised while applying events or requests to an engine.
///
/// A failed operation leaves the engine state exactly as it was before the call.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderKey),
    #[error(
        "Stale or duplicate event for order {cid}: {event} received in terminal state {state}"
    )]
    StaleEvent {
        cid: ClientOrderId,
        state: &'static str,
        event: &'static str,
    },
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(InstrumentIndex),
    #[error("Unknown asset: {0}")]
    UnknownAsset(AssetIndex),
    #[error("Order key mismatch for {cid}: expected {expected}, received {actual}")]
    OrderKeyMismatch {
        cid: ClientOrderId,
        expected: OrderKey,
        actual: OrderKey,
    },
    #[error("Trade {trade} side {trade_side} does not match side {order_side} of order {cid}")]
    TradeSideMismatch {
        cid: ClientOrderId,
        trade: TradeId,
        order_side: Side,
        trade_side: Side,
    },
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Instrument(#[from] InstrumentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
