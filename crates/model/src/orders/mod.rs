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

//! Order types for the trading domain model, and the per-order state machine.

pub mod request;
pub mod state;

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Re-exports
pub use self::{
    request::{OrderRequestCancel, OrderRequestOpen, RequestOpen},
    state::{
        ActiveOrderState, CancelInFlight, Cancelled, InactiveOrderState, Open, OpenFailed,
        OrderEvent, OrderRejection, OrderState,
    },
};
use crate::{
    enums::{OrderKind, Side, TimeInForce},
    identifiers::{ClientOrderId, ExchangeIndex, InstrumentIndex, OrderId, StrategyId},
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Invalid order state transition: {event} is not valid from {state}")]
    InvalidStateTransition {
        state: &'static str,
        event: &'static str,
    },
    #[error("Stale or duplicate event for order {cid}: {event} received in terminal state {state}")]
    Terminal {
        cid: ClientOrderId,
        state: &'static str,
        event: &'static str,
    },
    #[error(
        "Order {cid} overfilled: fill of {fill} on filled {filled} exceeds requested quantity {requested}"
    )]
    Overfill {
        cid: ClientOrderId,
        requested: Decimal,
        filled: Decimal,
        fill: Decimal,
    },
    #[error("Invalid fill quantity for order {cid}: must be positive, was {quantity}")]
    InvalidFillQuantity {
        cid: ClientOrderId,
        quantity: Decimal,
    },
    #[error("Order ID mismatch for order {cid}: expected {expected}, was {actual}")]
    OrderIdMismatch {
        cid: ClientOrderId,
        expected: OrderId,
        actual: OrderId,
    },
    #[error("Invalid order quantity: must be positive, was {0}")]
    InvalidQuantity(Decimal),
    #[error("Invalid price for {kind} order: {price}")]
    InvalidPrice { kind: OrderKind, price: Decimal },
}

/// Uniquely identifies one order's lifecycle within a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderKey {
    pub exchange: ExchangeIndex,
    pub instrument: InstrumentIndex,
    pub strategy: StrategyId,
    pub cid: ClientOrderId,
}

impl OrderKey {
    /// Creates a new [`OrderKey`] instance.
    #[must_use]
    pub const fn new(
        exchange: ExchangeIndex,
        instrument: InstrumentIndex,
        strategy: StrategyId,
        cid: ClientOrderId,
    ) -> Self {
        Self {
            exchange,
            instrument,
            strategy,
            cid,
        }
    }
}

impl Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderKey(exchange={}, instrument={}, strategy={}, cid={})",
            self.exchange.index(),
            self.instrument.index(),
            self.strategy,
            self.cid
        )
    }
}

/// An order and its current lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub key: OrderKey,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
    pub state: OrderState,
}

impl Order {
    /// Creates a new `OpenInFlight` order from an approved open request.
    #[must_use]
    pub fn from_request(request: &OrderRequestOpen) -> Self {
        Self {
            key: request.key,
            side: request.request.side,
            price: request.request.price,
            quantity: request.request.quantity,
            kind: request.request.kind,
            time_in_force: request.request.time_in_force,
            state: OrderState::Active(ActiveOrderState::OpenInFlight),
        }
    }

    /// Returns whether the order is still active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Returns the filled quantity where it is known from the state.
    ///
    /// `Cancelled` and `Expired` orders do not retain their fill progress.
    #[must_use]
    pub fn filled_quantity(&self) -> Option<Decimal> {
        match &self.state {
            OrderState::Active(ActiveOrderState::OpenInFlight)
            | OrderState::Active(ActiveOrderState::CancelInFlight(CancelInFlight { order: None }))
            | OrderState::Inactive(InactiveOrderState::OpenFailed(_)) => Some(Decimal::ZERO),
            OrderState::Active(ActiveOrderState::Open(open))
            | OrderState::Active(ActiveOrderState::CancelInFlight(CancelInFlight {
                order: Some(open),
            })) => Some(open.filled_quantity),
            OrderState::Inactive(InactiveOrderState::FullyFilled) => Some(self.quantity),
            OrderState::Inactive(InactiveOrderState::Cancelled(_) | InactiveOrderState::Expired) => {
                None
            }
        }
    }

    /// Returns `quantity - filled_quantity` where the filled quantity is known.
    #[must_use]
    pub fn quantity_remaining(&self) -> Option<Decimal> {
        self.filled_quantity().map(|filled| self.quantity - filled)
    }

    /// Returns the remaining quantity signed by side (positive for buys).
    #[must_use]
    pub fn signed_quantity_remaining(&self) -> Option<Decimal> {
        self.quantity_remaining().map(|remaining| match self.side {
            Side::Buy => remaining,
            Side::Sell => -remaining,
        })
    }

    /// Computes the state `event` would move this order into, without mutating it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The order is in a terminal state (stale or duplicate event).
    /// - The event is not valid from the current state.
    /// - A fill is not positive, or would push the filled quantity past the requested quantity.
    /// - A cancel acknowledgement names a different exchange order ID.
    pub fn next_state(&self, event: &OrderEvent) -> Result<OrderState, OrderError> {
        use ActiveOrderState as A;

        let active = match &self.state {
            OrderState::Active(active) => active,
            OrderState::Inactive(inactive) => {
                return Err(OrderError::Terminal {
                    cid: self.key.cid,
                    state: inactive.into(),
                    event: event.name(),
                });
            }
        };

        let next = match (active, event) {
            (
                A::OpenInFlight,
                OrderEvent::OpenAccepted {
                    order_id,
                    time_exchange,
                },
            ) => OrderState::Active(A::Open(accepted(*order_id, *time_exchange))),
            (A::OpenInFlight, OrderEvent::OpenRejected { error }) => open_failed(error),
            (A::OpenInFlight, OrderEvent::CancelRequested) => cancel_in_flight(None),
            (A::Open(open), OrderEvent::Fill { quantity, .. }) => {
                self.fill(open, *quantity, |open| OrderState::Active(A::Open(open)))?
            }
            (A::Open(open), OrderEvent::CancelRequested) => cancel_in_flight(Some(open.clone())),
            (A::Open(_), OrderEvent::Expired { .. }) => {
                OrderState::Inactive(InactiveOrderState::Expired)
            }
            (
                A::CancelInFlight(in_flight),
                OrderEvent::CancelAccepted {
                    order_id,
                    time_exchange,
                },
            ) => {
                if let Some(open) = &in_flight.order {
                    self.check_order_id(open.order_id, *order_id)?;
                }
                OrderState::Inactive(InactiveOrderState::Cancelled(Cancelled {
                    order_id: *order_id,
                    time_exchange: *time_exchange,
                }))
            }
            (
                A::CancelInFlight(CancelInFlight { order: Some(open) }),
                OrderEvent::CancelRejected { .. },
            ) => OrderState::Active(A::Open(open.clone())),
            (
                A::CancelInFlight(CancelInFlight { order: Some(open) }),
                OrderEvent::Fill { quantity, .. },
            ) => self.fill(open, *quantity, |open| cancel_in_flight(Some(open)))?,
            (
                A::CancelInFlight(CancelInFlight { order: None }),
                OrderEvent::CancelRejected { .. },
            ) => OrderState::Active(A::OpenInFlight),
            (
                A::CancelInFlight(CancelInFlight { order: None }),
                OrderEvent::OpenAccepted {
                    order_id,
                    time_exchange,
                },
            ) => cancel_in_flight(Some(accepted(*order_id, *time_exchange))),
            (
                A::CancelInFlight(CancelInFlight { order: None }),
                OrderEvent::OpenRejected { error },
            ) => open_failed(error),
            (state, event) => {
                return Err(OrderError::InvalidStateTransition {
                    state: state.into(),
                    event: event.name(),
                });
            }
        };

        Ok(next)
    }

    /// Applies `event`, moving the order into its next state.
    ///
    /// The order is left unchanged if the event is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn apply(&mut self, event: &OrderEvent) -> Result<(), OrderError> {
        let next = self.next_state(event)?;
        log::debug!("Order {} {} -> {}", self.key.cid, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Applies an exchange confirmation of the open.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn apply_open_ack(
        &mut self,
        order_id: OrderId,
        time_exchange: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.apply(&OrderEvent::OpenAccepted {
            order_id,
            time_exchange,
        })
    }

    /// Applies an exchange rejection of the open.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn apply_open_rejected(&mut self, error: OrderRejection) -> Result<(), OrderError> {
        self.apply(&OrderEvent::OpenRejected { error })
    }

    /// Applies a (partial) fill of `quantity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn apply_fill(
        &mut self,
        quantity: Decimal,
        time_exchange: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.apply(&OrderEvent::Fill {
            quantity,
            time_exchange,
        })
    }

    /// Marks a cancel request as dispatched.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn request_cancel(&mut self) -> Result<(), OrderError> {
        self.apply(&OrderEvent::CancelRequested)
    }

    /// Applies an exchange confirmation of the cancel.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn apply_cancel_ack(
        &mut self,
        order_id: OrderId,
        time_exchange: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.apply(&OrderEvent::CancelAccepted {
            order_id,
            time_exchange,
        })
    }

    /// Applies an exchange rejection of the cancel.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn apply_cancel_rejected(&mut self, error: OrderRejection) -> Result<(), OrderError> {
        self.apply(&OrderEvent::CancelRejected { error })
    }

    /// Applies expiry of the order's time in force.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid, see [`Order::next_state`].
    pub fn apply_expired(&mut self, time_exchange: DateTime<Utc>) -> Result<(), OrderError> {
        self.apply(&OrderEvent::Expired { time_exchange })
    }

    fn fill(
        &self,
        open: &Open,
        quantity: Decimal,
        wrap: impl FnOnce(Open) -> OrderState,
    ) -> Result<OrderState, OrderError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderError::InvalidFillQuantity {
                cid: self.key.cid,
                quantity,
            });
        }

        let filled = open.filled_quantity + quantity;
        if filled > self.quantity {
            return Err(OrderError::Overfill {
                cid: self.key.cid,
                requested: self.quantity,
                filled: open.filled_quantity,
                fill: quantity,
            });
        }

        if filled == self.quantity {
            Ok(OrderState::Inactive(InactiveOrderState::FullyFilled))
        } else {
            Ok(wrap(Open {
                filled_quantity: filled,
                ..open.clone()
            }))
        }
    }

    fn check_order_id(&self, expected: OrderId, actual: OrderId) -> Result<(), OrderError> {
        if expected != actual {
            return Err(OrderError::OrderIdMismatch {
                cid: self.key.cid,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

const fn accepted(order_id: OrderId, time_exchange: DateTime<Utc>) -> Open {
    Open {
        order_id,
        time_exchange,
        filled_quantity: Decimal::ZERO,
    }
}

fn cancel_in_flight(order: Option<Open>) -> OrderState {
    OrderState::Active(ActiveOrderState::CancelInFlight(CancelInFlight { order }))
}

fn open_failed(error: &OrderRejection) -> OrderState {
    OrderState::Inactive(InactiveOrderState::OpenFailed(OpenFailed {
        error: error.clone(),
    }))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::stubs::{order_request_open, time_plus_secs};

    fn accepted(id: &str) -> OrderEvent {
        OrderEvent::OpenAccepted {
            order_id: OrderId::from(id),
            time_exchange: time_plus_secs(1),
        }
    }

    fn fill(quantity: Decimal) -> OrderEvent {
        OrderEvent::Fill {
            quantity,
            time_exchange: time_plus_secs(2),
        }
    }

    fn cancel_accepted(id: &str) -> OrderEvent {
        OrderEvent::CancelAccepted {
            order_id: OrderId::from(id),
            time_exchange: time_plus_secs(3),
        }
    }

    fn expired() -> OrderEvent {
        OrderEvent::Expired {
            time_exchange: time_plus_secs(4),
        }
    }

    fn rejected() -> OrderEvent {
        OrderEvent::OpenRejected {
            error: OrderRejection::InsufficientBalance,
        }
    }

    fn cancel_rejected() -> OrderEvent {
        OrderEvent::CancelRejected {
            error: OrderRejection::ExchangeError("too late".to_string()),
        }
    }

    fn order_with_quantity(quantity: Decimal) -> Order {
        let mut request = order_request_open();
        request.request.quantity = quantity;
        Order::from_request(&request)
    }

    fn apply_all(order: &mut Order, events: &[OrderEvent]) {
        for event in events {
            order.apply(event).unwrap();
        }
    }

    #[rstest]
    fn test_new_order_is_open_in_flight() {
        let order = order_with_quantity(dec!(10));
        assert_eq!(order.state.name(), "OpenInFlight");
        assert!(order.is_active());
        assert_eq!(order.quantity_remaining(), Some(dec!(10)));
    }

    #[rstest]
    fn test_open_accepted_then_partial_fills_then_fully_filled() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &[accepted("A"), fill(dec!(3))]);

        assert_eq!(order.state.name(), "Open");
        assert_eq!(order.filled_quantity(), Some(dec!(3)));
        assert_eq!(order.quantity_remaining(), Some(dec!(7)));

        order.apply(&fill(dec!(7))).unwrap();
        assert_eq!(
            order.state,
            OrderState::Inactive(InactiveOrderState::FullyFilled)
        );
        assert_eq!(order.quantity_remaining(), Some(dec!(0)));
    }

    #[rstest]
    fn test_convenience_operations() {
        let mut order = order_with_quantity(dec!(5));
        order
            .apply_open_ack(OrderId::from("A"), time_plus_secs(1))
            .unwrap();
        order.apply_fill(dec!(2), time_plus_secs(2)).unwrap();
        order.request_cancel().unwrap();
        order
            .apply_cancel_rejected(OrderRejection::ExchangeError("busy".to_string()))
            .unwrap();
        order.apply_expired(time_plus_secs(3)).unwrap();
        assert_eq!(order.state.name(), "Expired");

        let mut order = order_with_quantity(dec!(5));
        order
            .apply_open_rejected(OrderRejection::UnknownInstrument)
            .unwrap();
        assert!(
            order
                .apply_cancel_ack(OrderId::from("A"), time_plus_secs(1))
                .is_err()
        );
    }

    #[rstest]
    fn test_open_rejected_is_terminal() {
        let mut order = order_with_quantity(dec!(10));
        order.apply(&rejected()).unwrap();
        assert_eq!(order.state.name(), "OpenFailed");
        assert!(!order.is_active());
    }

    #[rstest]
    fn test_cancel_flow() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(
            &mut order,
            &[accepted("A"), OrderEvent::CancelRequested, cancel_accepted("A")],
        );
        assert_eq!(
            order.state.order_id(),
            Some(OrderId::from("A"))
        );
        assert_eq!(order.state.name(), "Cancelled");
    }

    #[rstest]
    fn test_cancel_rejected_reverts_to_open_preserving_fills() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(
            &mut order,
            &[accepted("A"), fill(dec!(4)), OrderEvent::CancelRequested],
        );
        assert_eq!(order.state.name(), "CancelInFlight");

        order.apply(&cancel_rejected()).unwrap();
        assert_eq!(order.state.name(), "Open");
        assert_eq!(order.filled_quantity(), Some(dec!(4)));
    }

    #[rstest]
    fn test_fill_while_cancel_in_flight_updates_preserved_open() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(
            &mut order,
            &[accepted("A"), OrderEvent::CancelRequested, fill(dec!(6))],
        );
        assert_eq!(order.state.name(), "CancelInFlight");
        assert_eq!(order.filled_quantity(), Some(dec!(6)));

        order.apply(&fill(dec!(4))).unwrap();
        assert_eq!(order.state.name(), "FullyFilled");
    }

    #[rstest]
    fn test_cancel_before_open_ack() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &[OrderEvent::CancelRequested, accepted("A")]);
        assert_eq!(order.state.order_id(), Some(OrderId::from("A")));

        order.apply(&cancel_accepted("A")).unwrap();
        assert_eq!(order.state.name(), "Cancelled");
    }

    #[rstest]
    fn test_cancel_rejected_before_open_ack_reverts_to_in_flight() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &[OrderEvent::CancelRequested, cancel_rejected()]);
        assert_eq!(order.state.name(), "OpenInFlight");
    }

    #[rstest]
    fn test_expired() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &[accepted("A"), expired()]);
        assert_eq!(order.state.name(), "Expired");
        assert_eq!(order.filled_quantity(), None);
    }

    #[rstest]
    fn test_overfill_is_rejected_and_state_unchanged() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &[accepted("A"), fill(dec!(8))]);
        let before = order.clone();

        let result = order.apply(&fill(dec!(3)));
        assert_eq!(
            result,
            Err(OrderError::Overfill {
                cid: order.key.cid,
                requested: dec!(10),
                filled: dec!(8),
                fill: dec!(3),
            })
        );
        assert_eq!(order, before);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn test_non_positive_fill_rejected(#[case] quantity: Decimal) {
        let mut order = order_with_quantity(dec!(10));
        order.apply(&accepted("A")).unwrap();
        assert!(matches!(
            order.apply(&fill(quantity)),
            Err(OrderError::InvalidFillQuantity { .. })
        ));
    }

    #[rstest]
    fn test_cancel_ack_with_mismatched_order_id_rejected() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &[accepted("A"), OrderEvent::CancelRequested]);
        assert!(matches!(
            order.apply(&cancel_accepted("B")),
            Err(OrderError::OrderIdMismatch { .. })
        ));
    }

    #[rstest]
    #[case(vec![accepted("A"), fill(dec!(10))])]
    #[case(vec![rejected()])]
    #[case(vec![accepted("A"), expired()])]
    #[case(vec![accepted("A"), OrderEvent::CancelRequested, cancel_accepted("A")])]
    fn test_terminal_states_reject_every_event(#[case] path: Vec<OrderEvent>) {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &path);
        let terminal = order.clone();

        let events = [
            accepted("A"),
            rejected(),
            fill(dec!(1)),
            OrderEvent::CancelRequested,
            cancel_accepted("A"),
            cancel_rejected(),
            expired(),
        ];
        for event in &events {
            let result = order.apply(event);
            assert!(
                matches!(result, Err(OrderError::Terminal { .. })),
                "{} applied to terminal order",
                event.name()
            );
            assert_eq!(order, terminal);
        }
    }

    #[rstest]
    #[case(vec![], fill(dec!(1)))]
    #[case(vec![], expired())]
    #[case(vec![], cancel_accepted("A"))]
    #[case(vec![accepted("A")], accepted("A"))]
    #[case(vec![accepted("A")], cancel_rejected())]
    #[case(vec![accepted("A"), OrderEvent::CancelRequested], OrderEvent::CancelRequested)]
    fn test_invalid_transitions(#[case] path: Vec<OrderEvent>, #[case] event: OrderEvent) {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &path);
        assert!(matches!(
            order.apply(&event),
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[rstest]
    fn test_terminal_error_message() {
        let mut order = order_with_quantity(dec!(1));
        apply_all(&mut order, &[accepted("A"), fill(dec!(1))]);
        let err = order.apply(&fill(dec!(1))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Stale or duplicate event for order O-001: Fill received in terminal state FullyFilled"
        );
    }

    #[rstest]
    fn test_state_serde_round_trip() {
        let mut order = order_with_quantity(dec!(10));
        apply_all(&mut order, &[accepted("A"), fill(dec!(2.5))]);
        let json = serde_json::to_string(&order).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, order);
    }
}
