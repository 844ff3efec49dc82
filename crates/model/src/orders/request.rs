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

//! Outbound order requests, checked by risk management before dispatch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderError, OrderKey};
use crate::{
    enums::{OrderKind, Side, TimeInForce},
    identifiers::OrderId,
};

/// The parameters of a request to open an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOpen {
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
}

impl RequestOpen {
    /// Creates a new [`RequestOpen`] instance with correctness checking.
    ///
    /// For market orders `price` is the reference price used for notional calculations
    /// and may be zero when unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `quantity` is not positive.
    /// - `price` is negative, or not positive for a limit order.
    pub fn new_checked(
        side: Side,
        price: Decimal,
        quantity: Decimal,
        kind: OrderKind,
        time_in_force: TimeInForce,
    ) -> Result<Self, OrderError> {
        let request = Self {
            side,
            price,
            quantity,
            kind,
            time_in_force,
        };
        request.validate()?;
        Ok(request)
    }

    /// Validates the request parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity or price is invalid for the order kind.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::InvalidQuantity(self.quantity));
        }
        let price_valid = match self.kind {
            OrderKind::Market => self.price >= Decimal::ZERO,
            OrderKind::Limit => self.price > Decimal::ZERO,
        };
        if !price_valid {
            return Err(OrderError::InvalidPrice {
                kind: self.kind,
                price: self.price,
            });
        }
        Ok(())
    }

    /// Returns the requested quantity signed by side (positive for buys).
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        match self.side {
            Side::Buy => self.quantity,
            Side::Sell => -self.quantity,
        }
    }
}

/// A request to open the order identified by `key`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequestOpen {
    pub key: OrderKey,
    pub request: RequestOpen,
}

impl OrderRequestOpen {
    /// Creates a new [`OrderRequestOpen`] instance.
    #[must_use]
    pub const fn new(key: OrderKey, request: RequestOpen) -> Self {
        Self { key, request }
    }
}

/// A request to cancel the order identified by `key`.
///
/// `order_id` is `None` when cancelling an order the exchange has not yet acknowledged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequestCancel {
    pub key: OrderKey,
    pub order_id: Option<OrderId>,
}

impl OrderRequestCancel {
    /// Creates a new [`OrderRequestCancel`] instance.
    #[must_use]
    pub const fn new(key: OrderKey, order_id: Option<OrderId>) -> Self {
        Self { key, order_id }
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

    #[rstest]
    #[case(OrderKind::Limit, dec!(100), dec!(1), true)]
    #[case(OrderKind::Market, dec!(0), dec!(1), true)]
    #[case(OrderKind::Limit, dec!(0), dec!(1), false)]
    #[case(OrderKind::Market, dec!(-1), dec!(1), false)]
    #[case(OrderKind::Limit, dec!(100), dec!(0), false)]
    #[case(OrderKind::Limit, dec!(100), dec!(-2), false)]
    fn test_request_open_validation(
        #[case] kind: OrderKind,
        #[case] price: Decimal,
        #[case] quantity: Decimal,
        #[case] expected: bool,
    ) {
        let result =
            RequestOpen::new_checked(Side::Buy, price, quantity, kind, TimeInForce::GoodUntilCancelled);
        assert_eq!(result.is_ok(), expected);
    }

    #[rstest]
    fn test_signed_quantity() {
        let buy = RequestOpen::new_checked(
            Side::Buy,
            dec!(10),
            dec!(2),
            OrderKind::Limit,
            TimeInForce::GoodUntilCancelled,
        )
        .unwrap();
        let sell = RequestOpen { side: Side::Sell, ..buy };
        assert_eq!(buy.signed_quantity(), dec!(2));
        assert_eq!(sell.signed_quantity(), dec!(-2));
    }
}
