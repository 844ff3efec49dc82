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

use ahash::AHashMap;
use meridian_model::{
    identifiers::{ClientOrderId, InstrumentIndex},
    orders::{Order, OrderKey, OrderState},
};
use rust_decimal::Decimal;

/// Tracks active orders by client order ID and retains terminal orders as history.
#[derive(Debug, Clone, Default)]
pub struct OrderManager {
    active: AHashMap<ClientOrderId, Order>,
    history: Vec<Order>,
}

/// Where an order currently lives in an [`OrderManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderLookup<'a> {
    Active(&'a Order),
    Terminal(&'a Order),
    Unknown,
}

impl OrderManager {
    /// Creates a new empty [`OrderManager`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active order with client order ID `cid`.
    #[must_use]
    pub fn get(&self, cid: &ClientOrderId) -> Option<&Order> {
        self.active.get(cid)
    }

    /// Locates the order with client order ID `cid` among active and terminal orders.
    #[must_use]
    pub fn lookup(&self, cid: &ClientOrderId) -> OrderLookup<'_> {
        if let Some(order) = self.active.get(cid) {
            return OrderLookup::Active(order);
        }
        // Most recent first, stale events usually refer to recently closed orders
        self.history
            .iter()
            .rev()
            .find(|order| order.key.cid == *cid)
            .map_or(OrderLookup::Unknown, OrderLookup::Terminal)
    }

    /// Returns whether `cid` has ever been used, by an active or a terminal order.
    #[must_use]
    pub fn contains(&self, cid: &ClientOrderId) -> bool {
        !matches!(self.lookup(cid), OrderLookup::Unknown)
    }

    /// Inserts a newly approved order.
    pub fn insert(&mut self, order: Order) {
        self.active.insert(order.key.cid, order);
    }

    /// Sets the state of the active order `key`, moving it to history if the state is terminal.
    ///
    /// Returns `false` if no active order matches `key`.
    pub fn commit(&mut self, key: &OrderKey, state: OrderState) -> bool {
        let Some(order) = self.active.get_mut(&key.cid) else {
            return false;
        };
        order.state = state;

        if !order.is_active()
            && let Some(order) = self.active.remove(&key.cid)
        {
            log::debug!("Order {} closed in state {}", order.key.cid, order.state);
            self.history.push(order);
        }
        true
    }

    /// Returns an iterator over the active orders, in no particular order.
    pub fn active(&self) -> impl Iterator<Item = &Order> {
        self.active.values()
    }

    /// Returns the terminal orders in the order they closed.
    #[must_use]
    pub fn history(&self) -> &[Order] {
        &self.history
    }

    #[must_use]
    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    /// Returns the net signed unfilled quantity of the active orders of each instrument.
    ///
    /// Orders in flight count for their full quantity, open orders for what is left to fill.
    #[must_use]
    pub fn pending_quantities(&self) -> Vec<(InstrumentIndex, Decimal)> {
        let mut pending: AHashMap<InstrumentIndex, Decimal> = AHashMap::new();
        for order in self.active.values() {
            if let Some(remaining) = order.signed_quantity_remaining() {
                *pending.entry(order.key.instrument).or_default() += remaining;
            }
        }
        pending.into_iter().collect()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use meridian_model::{
        enums::Side,
        identifiers::{ClientOrderId, OrderId},
        orders::{ActiveOrderState, InactiveOrderState, Open, OrderRequestOpen},
        stubs::{order_key_for, order_request_open, order_request_open_for, time_plus_secs},
    };
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_commit_keeps_active_states(order_request_open: OrderRequestOpen) {
        let mut manager = OrderManager::new();
        manager.insert(Order::from_request(&order_request_open));

        let open = OrderState::Active(ActiveOrderState::Open(Open {
            order_id: OrderId::from("EX-1"),
            time_exchange: time_plus_secs(1),
            filled_quantity: Decimal::ZERO,
        }));
        assert!(manager.commit(&order_request_open.key, open.clone()));

        let cid = order_request_open.key.cid;
        assert_eq!(manager.get(&cid).map(|order| &order.state), Some(&open));
        assert_eq!(manager.num_active(), 1);
        assert!(manager.history().is_empty());
    }

    #[rstest]
    fn test_commit_moves_terminal_orders_to_history(order_request_open: OrderRequestOpen) {
        let mut manager = OrderManager::new();
        manager.insert(Order::from_request(&order_request_open));

        let filled = OrderState::Inactive(InactiveOrderState::FullyFilled);
        assert!(manager.commit(&order_request_open.key, filled));

        let cid = order_request_open.key.cid;
        assert!(manager.get(&cid).is_none());
        assert!(matches!(manager.lookup(&cid), OrderLookup::Terminal(_)));
        assert!(manager.contains(&cid));
        assert_eq!(manager.history().len(), 1);
    }

    #[rstest]
    fn test_commit_unknown_order(order_request_open: OrderRequestOpen) {
        let mut manager = OrderManager::new();
        assert!(!manager.commit(
            &order_request_open.key,
            OrderState::Inactive(InactiveOrderState::Expired)
        ));
        assert_eq!(
            manager.lookup(&ClientOrderId::from("O-404")),
            OrderLookup::Unknown
        );
    }

    #[rstest]
    fn test_pending_quantities_net_active_orders() {
        let btc = InstrumentIndex::new(0);
        let eth = InstrumentIndex::new(1);
        let mut manager = OrderManager::new();
        let buy = order_request_open_for(order_key_for(btc, "O-1"), Side::Buy, dec!(100), dec!(3));
        let sell = order_request_open_for(order_key_for(btc, "O-2"), Side::Sell, dec!(100), dec!(1));
        let filled = order_request_open_for(order_key_for(eth, "O-3"), Side::Buy, dec!(10), dec!(5));
        for request in [&buy, &sell, &filled] {
            manager.insert(Order::from_request(request));
        }

        // Partially filled buy keeps only its remainder pending
        let open = OrderState::Active(ActiveOrderState::Open(Open {
            order_id: OrderId::from("EX-1"),
            time_exchange: time_plus_secs(1),
            filled_quantity: dec!(1),
        }));
        manager.commit(&buy.key, open);
        manager.commit(&filled.key, OrderState::Inactive(InactiveOrderState::FullyFilled));

        let pending = manager.pending_quantities();
        assert_eq!(pending, vec![(btc, dec!(1))]);
    }
}
