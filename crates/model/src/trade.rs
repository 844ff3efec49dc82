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

//! Trade fills reported by an exchange.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    enums::Side,
    identifiers::{InstrumentIndex, OrderId, TradeId},
    orders::OrderKey,
};

/// A single fill of an order.
///
/// `quantity` is always positive, the direction is carried by `side`. `fees` are
/// denominated in the instrument's quote asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub key: OrderKey,
    pub order_id: OrderId,
    pub time_exchange: DateTime<Utc>,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fees: Decimal,
}

impl Trade {
    /// Returns the instrument the trade executed on.
    #[must_use]
    pub const fn instrument(&self) -> InstrumentIndex {
        self.key.instrument
    }

    /// Returns the traded value in the quote asset.
    #[must_use]
    pub fn value_quote(&self) -> Decimal {
        self.price * self.quantity.abs()
    }

    /// Returns the quantity signed by side, positive for buys.
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        match self.side {
            Side::Buy => self.quantity,
            Side::Sell => -self.quantity,
        }
    }
}

impl Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade(id={}, cid={}, side={}, quantity={}, price={}, fees={}, ts={})",
            self.id,
            self.key.cid,
            self.side,
            self.quantity,
            self.price,
            self.fees,
            self.time_exchange.to_rfc3339(),
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::stubs::trade;

    #[rstest]
    fn test_value_quote() {
        let trade = trade(Side::Sell, dec!(20_000), dec!(0.5), dec!(1));
        assert_eq!(trade.value_quote(), dec!(10_000));
        assert_eq!(trade.signed_quantity(), dec!(-0.5));
    }

    #[rstest]
    fn test_display() {
        let trade = trade(Side::Buy, dec!(100), dec!(2), dec!(0.1));
        assert_eq!(
            trade.to_string(),
            "Trade(id=T-1, cid=O-001, side=BUY, quantity=2, price=100, fees=0.1, ts=1970-01-01T00:00:00+00:00)"
        );
    }
}
