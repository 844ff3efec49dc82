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

//! Identifiers for the trading domain model.
//!
//! String identifiers are interned with [`Ustr`], so they are `Copy` and cheap to hash.
//! Index identifiers address the dense tables of an
//! [`IndexedInstruments`](crate::instruments::IndexedInstruments) registry.

use std::fmt::{Debug, Display, Formatter};

use meridian_core::correctness::{FAILED, check_valid_string};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ustr::Ustr;

#[macro_use]
mod macros;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

ustr_identifier!(
    /// Represents a valid client order ID (assigned by the strategy, unique per session).
    ClientOrderId
);

ustr_identifier!(
    /// Represents a valid strategy ID.
    StrategyId
);

ustr_identifier!(
    /// Represents a valid order ID (assigned by the exchange once an order is accepted).
    OrderId
);

ustr_identifier!(
    /// Represents a valid trade match ID (assigned by the exchange).
    TradeId
);

ustr_identifier!(
    /// Represents a valid exchange ID (e.g. `BINANCE_SPOT`).
    ExchangeId
);

ustr_identifier!(
    /// Represents a valid asset name on an exchange (e.g. `usdt`).
    AssetName
);

ustr_identifier!(
    /// Represents a valid instrument name (e.g. `binance_spot-btc_usdt`).
    InstrumentName
);

index_identifier!(
    /// Index of an exchange in the instrument registry.
    ExchangeIndex,
    "ExchangeIndex"
);

index_identifier!(
    /// Index of an exchange asset in the instrument registry.
    AssetIndex,
    "AssetIndex"
);

index_identifier!(
    /// Index of an instrument in the instrument registry.
    InstrumentIndex,
    "InstrumentIndex"
);
