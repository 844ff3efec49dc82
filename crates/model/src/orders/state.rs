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

//! Order lifecycle states and the transition table between them.
//!
//! ```text
//! (create)       -> OpenInFlight
//! OpenInFlight   -> Open | OpenFailed | CancelInFlight(None)
//! Open           -> Open (partial fill) | FullyFilled | CancelInFlight(Some) | Expired
//! CancelInFlight -> Cancelled | Open (cancel rejected) | FullyFilled
//! ```
//!
//! Inactive states are terminal and never mutated.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, IntoStaticStr};

use crate::identifiers::OrderId;

/// The reason an exchange rejected an order request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderRejection {
    InsufficientBalance,
    InvalidPrice,
    InvalidQuantity,
    UnknownInstrument,
    ExchangeError(String),
}

impl Display for OrderRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExchangeError(message) => write!(f, "exchange_error: {message}"),
            other => write!(f, "{}", other.as_ref()),
        }
    }
}

/// The lifecycle state of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    Active(ActiveOrderState),
    Inactive(InactiveOrderState),
}

/// States in which the exchange may still act on the order.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
pub enum ActiveOrderState {
    /// Submitted, not yet confirmed by the exchange.
    OpenInFlight,
    /// Confirmed and resting on the exchange.
    Open(Open),
    /// Cancel submitted, not yet confirmed by the exchange.
    CancelInFlight(CancelInFlight),
}

/// Terminal states.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
pub enum InactiveOrderState {
    Cancelled(Cancelled),
    FullyFilled,
    Expired,
    OpenFailed(OpenFailed),
}

/// An order confirmed and resting on the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    pub order_id: OrderId,
    pub time_exchange: DateTime<Utc>,
    pub filled_quantity: Decimal,
}

/// A cancel request awaiting confirmation, holding the open state it would revert to.
///
/// `order` is `None` when the cancel was requested before the open was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelInFlight {
    pub order: Option<Open>,
}

/// A cancelled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancelled {
    pub order_id: OrderId,
    pub time_exchange: DateTime<Utc>,
}

/// An order the exchange refused to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFailed {
    pub error: OrderRejection,
}

impl OrderState {
    /// Returns the state name, e.g. `"OpenInFlight"` or `"FullyFilled"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active(state) => state.into(),
            Self::Inactive(state) => state.into(),
        }
    }

    /// Returns whether the state is active (non-terminal).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Returns the exchange order ID, if one has been assigned.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Active(ActiveOrderState::Open(open))
            | Self::Active(ActiveOrderState::CancelInFlight(CancelInFlight { order: Some(open) })) => {
                Some(open.order_id)
            }
            Self::Inactive(InactiveOrderState::Cancelled(cancelled)) => Some(cancelled.order_id),
            _ => None,
        }
    }
}

impl Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An event driving an order through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize)]
pub enum OrderEvent {
    /// The exchange confirmed the open.
    OpenAccepted {
        order_id: OrderId,
        time_exchange: DateTime<Utc>,
    },
    /// The exchange rejected the open.
    OpenRejected { error: OrderRejection },
    /// The order (partially) filled.
    Fill {
        quantity: Decimal,
        time_exchange: DateTime<Utc>,
    },
    /// A cancel request was dispatched.
    CancelRequested,
    /// The exchange confirmed the cancel.
    CancelAccepted {
        order_id: OrderId,
        time_exchange: DateTime<Utc>,
    },
    /// The exchange rejected the cancel.
    CancelRejected { error: OrderRejection },
    /// The order's time in force elapsed.
    Expired { time_exchange: DateTime<Utc> },
}

impl OrderEvent {
    /// Returns the event name, e.g. `"Fill"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
