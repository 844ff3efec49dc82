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

//! Events consumed by the engine: account updates, market data and explicit time updates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{
    balance::AssetBalance,
    enums::Side,
    identifiers::{ExchangeIndex, InstrumentIndex, OrderId},
    orders::{OrderEvent, OrderKey, OrderRejection},
    trade::Trade,
};

/// An event driving the engine.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
pub enum EngineEvent {
    Account(AccountEvent),
    Market(MarketEvent),
    /// Advances the engine clock without any other state change.
    TimeUpdate(DateTime<Utc>),
}

impl EngineEvent {
    /// Returns the exchange (or engine) timestamp of the event.
    #[must_use]
    pub fn time_exchange(&self) -> DateTime<Utc> {
        match self {
            Self::Account(event) => event.kind.time_exchange(),
            Self::Market(event) => event.time_exchange,
            Self::TimeUpdate(time) => *time,
        }
    }

    /// Returns the event name, e.g. `"Account"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl From<AccountEvent> for EngineEvent {
    fn from(value: AccountEvent) -> Self {
        Self::Account(value)
    }
}

impl From<MarketEvent> for EngineEvent {
    fn from(value: MarketEvent) -> Self {
        Self::Market(value)
    }
}

/// An update from an exchange account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEvent {
    pub exchange: ExchangeIndex,
    pub kind: AccountEventKind,
}

impl AccountEvent {
    /// Creates a new [`AccountEvent`] instance.
    #[must_use]
    pub const fn new(exchange: ExchangeIndex, kind: AccountEventKind) -> Self {
        Self { exchange, kind }
    }
}

/// The payload of an [`AccountEvent`].
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
pub enum AccountEventKind {
    BalanceSnapshot(AssetBalance),
    OpenAccepted {
        key: OrderKey,
        order_id: OrderId,
        time_exchange: DateTime<Utc>,
    },
    OpenRejected {
        key: OrderKey,
        error: OrderRejection,
        time_exchange: DateTime<Utc>,
    },
    CancelAccepted {
        key: OrderKey,
        order_id: OrderId,
        time_exchange: DateTime<Utc>,
    },
    CancelRejected {
        key: OrderKey,
        error: OrderRejection,
        time_exchange: DateTime<Utc>,
    },
    OrderExpired {
        key: OrderKey,
        time_exchange: DateTime<Utc>,
    },
    Trade(Trade),
}

impl AccountEventKind {
    /// Returns the exchange timestamp of the event.
    #[must_use]
    pub fn time_exchange(&self) -> DateTime<Utc> {
        match self {
            Self::BalanceSnapshot(balance) => balance.time_exchange,
            Self::OpenAccepted { time_exchange, .. }
            | Self::OpenRejected { time_exchange, .. }
            | Self::CancelAccepted { time_exchange, .. }
            | Self::CancelRejected { time_exchange, .. }
            | Self::OrderExpired { time_exchange, .. } => *time_exchange,
            Self::Trade(trade) => trade.time_exchange,
        }
    }

    /// Returns the key of the order the event refers to, if any.
    #[must_use]
    pub const fn order_key(&self) -> Option<&OrderKey> {
        match self {
            Self::BalanceSnapshot(_) => None,
            Self::OpenAccepted { key, .. }
            | Self::OpenRejected { key, .. }
            | Self::CancelAccepted { key, .. }
            | Self::CancelRejected { key, .. }
            | Self::OrderExpired { key, .. } => Some(key),
            Self::Trade(trade) => Some(&trade.key),
        }
    }

    /// Converts the event into the order lifecycle event it implies, if any.
    #[must_use]
    pub fn to_order_event(&self) -> Option<OrderEvent> {
        let event = match self {
            Self::BalanceSnapshot(_) => return None,
            Self::OpenAccepted {
                order_id,
                time_exchange,
                ..
            } => OrderEvent::OpenAccepted {
                order_id: *order_id,
                time_exchange: *time_exchange,
            },
            Self::OpenRejected { error, .. } => OrderEvent::OpenRejected {
                error: error.clone(),
            },
            Self::CancelAccepted {
                order_id,
                time_exchange,
                ..
            } => OrderEvent::CancelAccepted {
                order_id: *order_id,
                time_exchange: *time_exchange,
            },
            Self::CancelRejected { error, .. } => OrderEvent::CancelRejected {
                error: error.clone(),
            },
            Self::OrderExpired { time_exchange, .. } => OrderEvent::Expired {
                time_exchange: *time_exchange,
            },
            Self::Trade(trade) => OrderEvent::Fill {
                quantity: trade.quantity.abs(),
                time_exchange: trade.time_exchange,
            },
        };
        Some(event)
    }

    /// Returns the event name, e.g. `"Trade"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// A market data update for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub time_exchange: DateTime<Utc>,
    pub exchange: ExchangeIndex,
    pub instrument: InstrumentIndex,
    pub kind: DataKind,
}

/// The payload of a [`MarketEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    Trade {
        price: Decimal,
        amount: Decimal,
        side: Side,
    },
    Candle {
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    },
    OrderBookL1 {
        best_bid: Option<Decimal>,
        best_ask: Option<Decimal>,
    },
}

impl DataKind {
    /// Returns the price best describing the market after this update.
    ///
    /// Uses the last trade price, the candle close, or the L1 mid (one side if the other is empty).
    #[must_use]
    pub fn reference_price(&self) -> Option<Decimal> {
        match self {
            Self::Trade { price, .. } => Some(*price),
            Self::Candle { close, .. } => Some(*close),
            Self::OrderBookL1 { best_bid, best_ask } => match (best_bid, best_ask) {
                (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
                (Some(price), None) | (None, Some(price)) => Some(*price),
                (None, None) => None,
            },
        }
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
    use crate::stubs::{order_key, time_plus_secs, trade};

    #[rstest]
    #[case(DataKind::Trade { price: dec!(101), amount: dec!(1), side: Side::Buy }, Some(dec!(101)))]
    #[case(DataKind::Candle { open: dec!(1), high: dec!(3), low: dec!(1), close: dec!(2), volume: dec!(9) }, Some(dec!(2)))]
    #[case(DataKind::OrderBookL1 { best_bid: Some(dec!(99)), best_ask: Some(dec!(101)) }, Some(dec!(100)))]
    #[case(DataKind::OrderBookL1 { best_bid: None, best_ask: Some(dec!(101)) }, Some(dec!(101)))]
    #[case(DataKind::OrderBookL1 { best_bid: None, best_ask: None }, None)]
    fn test_reference_price(#[case] kind: DataKind, #[case] expected: Option<Decimal>) {
        assert_eq!(kind.reference_price(), expected);
    }

    #[rstest]
    fn test_trade_maps_to_fill() {
        let trade = trade(Side::Sell, dec!(10), dec!(3), dec!(0));
        let kind = AccountEventKind::Trade(trade.clone());

        assert_eq!(kind.order_key(), Some(&trade.key));
        assert_eq!(
            kind.to_order_event(),
            Some(OrderEvent::Fill {
                quantity: dec!(3),
                time_exchange: trade.time_exchange,
            })
        );
    }

    #[rstest]
    fn test_engine_event_time_and_serde() {
        let event = EngineEvent::from(AccountEvent::new(
            ExchangeIndex::new(0),
            AccountEventKind::OrderExpired {
                key: order_key(),
                time_exchange: time_plus_secs(5),
            },
        ));
        assert_eq!(event.time_exchange(), time_plus_secs(5));
        assert_eq!(event.name(), "Account");

        let json = serde_json::to_string(&event).unwrap();
        let parsed: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
