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

//! A `Position` for the trading domain model.
//!
//! A position is opened by a trade on a flat instrument, grows with trades on the same
//! side, and shrinks with trades on the opposite side. A trade larger than the open
//! quantity exits the position and opens a new one on the other side with the remainder.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    enums::Side,
    identifiers::{InstrumentIndex, TradeId},
    trade::Trade,
};

/// Represents an open position in an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub instrument: InstrumentIndex,
    pub side: Side,
    pub price_entry_average: Decimal,
    pub quantity_abs: Decimal,
    pub quantity_abs_max: Decimal,
    pub pnl_unrealised: Decimal,
    /// Realised PnL net of all fees paid so far.
    pub pnl_realised: Decimal,
    pub fees_enter: Decimal,
    pub fees_exit: Decimal,
    pub time_enter: DateTime<Utc>,
    pub time_exchange_update: DateTime<Utc>,
    pub trades: Vec<TradeId>,
}

/// A position that has been fully exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionExited {
    pub instrument: InstrumentIndex,
    pub side: Side,
    pub price_entry_average: Decimal,
    pub quantity_abs_max: Decimal,
    pub pnl_realised: Decimal,
    pub fees_enter: Decimal,
    pub fees_exit: Decimal,
    pub time_enter: DateTime<Utc>,
    pub time_exit: DateTime<Utc>,
    pub trades: Vec<TradeId>,
}

/// The outcome of applying a trade to a [`Position`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    /// The position left open after the trade, if any.
    pub current: Option<Position>,
    /// The position exited by the trade, if any.
    pub exited: Option<PositionExited>,
}

impl Position {
    /// Opens a new position from `trade`. Entry fees are charged to realised PnL.
    #[must_use]
    pub fn from_trade(trade: &Trade) -> Self {
        Self::open(trade, trade.quantity.abs(), trade.fees)
    }

    fn open(trade: &Trade, quantity: Decimal, fees: Decimal) -> Self {
        Self {
            instrument: trade.instrument(),
            side: trade.side,
            price_entry_average: trade.price,
            quantity_abs: quantity,
            quantity_abs_max: quantity,
            pnl_unrealised: Decimal::ZERO,
            pnl_realised: -fees,
            fees_enter: fees,
            fees_exit: Decimal::ZERO,
            time_enter: trade.time_exchange,
            time_exchange_update: trade.time_exchange,
            trades: vec![trade.id],
        }
    }

    /// Applies `trade` to the position, consuming it.
    #[must_use]
    pub fn update_from_trade(mut self, trade: &Trade) -> PositionUpdate {
        let quantity = trade.quantity.abs();
        self.time_exchange_update = trade.time_exchange;
        self.trades.push(trade.id);

        if trade.side == self.side {
            let quantity_new = self.quantity_abs + quantity;
            self.price_entry_average = (self.price_entry_average * self.quantity_abs
                + trade.price * quantity)
                / quantity_new;
            self.quantity_abs = quantity_new;
            self.quantity_abs_max = self.quantity_abs_max.max(quantity_new);
            self.fees_enter += trade.fees;
            self.pnl_realised -= trade.fees;
            self.update_pnl_unrealised(trade.price);

            return PositionUpdate {
                current: Some(self),
                exited: None,
            };
        }

        if quantity < self.quantity_abs {
            self.close_quantity(trade.price, quantity, trade.fees);
            self.update_pnl_unrealised(trade.price);

            return PositionUpdate {
                current: Some(self),
                exited: None,
            };
        }

        if quantity == self.quantity_abs {
            self.close_quantity(trade.price, quantity, trade.fees);
            return PositionUpdate {
                current: None,
                exited: Some(self.into_exited(trade.time_exchange)),
            };
        }

        // Flip: fees are prorated between the exit and the new entry
        let quantity_exit = self.quantity_abs;
        let fees_exit = trade.fees * quantity_exit / quantity;
        let fees_enter = trade.fees - fees_exit;
        self.close_quantity(trade.price, quantity_exit, fees_exit);

        PositionUpdate {
            current: Some(Self::open(trade, quantity - quantity_exit, fees_enter)),
            exited: Some(self.into_exited(trade.time_exchange)),
        }
    }

    /// Marks the open quantity to `price`.
    pub fn update_pnl_unrealised(&mut self, price: Decimal) {
        self.pnl_unrealised =
            calculate_pnl(self.side, self.price_entry_average, price, self.quantity_abs);
    }

    /// Returns the open quantity signed by side, positive for long.
    #[must_use]
    pub fn quantity_signed(&self) -> Decimal {
        match self.side {
            Side::Buy => self.quantity_abs,
            Side::Sell => -self.quantity_abs,
        }
    }

    fn close_quantity(&mut self, price: Decimal, quantity: Decimal, fees: Decimal) {
        self.pnl_realised +=
            calculate_pnl(self.side, self.price_entry_average, price, quantity) - fees;
        self.fees_exit += fees;
        self.quantity_abs -= quantity;
    }

    fn into_exited(self, time_exit: DateTime<Utc>) -> PositionExited {
        PositionExited {
            instrument: self.instrument,
            side: self.side,
            price_entry_average: self.price_entry_average,
            quantity_abs_max: self.quantity_abs_max,
            pnl_realised: self.pnl_realised,
            fees_enter: self.fees_enter,
            fees_exit: self.fees_exit,
            time_enter: self.time_enter,
            time_exit,
            trades: self.trades,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Position({} {} {} @ {}, pnl_realised={}, pnl_unrealised={})",
            self.side,
            self.quantity_abs,
            self.instrument,
            self.price_entry_average,
            self.pnl_realised,
            self.pnl_unrealised,
        )
    }
}

impl PositionExited {
    /// Returns the entry value of the largest quantity held.
    #[must_use]
    pub fn value_entry_max(&self) -> Decimal {
        self.quantity_abs_max * self.price_entry_average
    }
}

/// Calculates the PnL of closing `quantity` entered at `price_entry` at `price_exit`.
#[must_use]
pub fn calculate_pnl(
    side: Side,
    price_entry: Decimal,
    price_exit: Decimal,
    quantity: Decimal,
) -> Decimal {
    match side {
        Side::Buy => (price_exit - price_entry) * quantity,
        Side::Sell => (price_entry - price_exit) * quantity,
    }
}
