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
    identifiers::InstrumentIndex,
    position::{Position, PositionExited, PositionUpdate},
    trade::Trade,
};
use rust_decimal::Decimal;

/// Keeps the open position of each instrument.
#[derive(Debug, Clone, Default)]
pub struct PositionManager {
    positions: AHashMap<InstrumentIndex, Position>,
}

impl PositionManager {
    /// Creates a new empty [`PositionManager`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, instrument: InstrumentIndex) -> Option<&Position> {
        self.positions.get(&instrument)
    }

    /// Returns the outcome of applying `trade` without changing any position.
    #[must_use]
    pub fn preview(&self, trade: &Trade) -> PositionUpdate {
        match self.positions.get(&trade.instrument()) {
            Some(position) => position.clone().update_from_trade(trade),
            None => PositionUpdate {
                current: Some(Position::from_trade(trade)),
                exited: None,
            },
        }
    }

    /// Commits a previewed update for `instrument`, returning the exited position if any.
    pub fn commit(
        &mut self,
        instrument: InstrumentIndex,
        update: PositionUpdate,
    ) -> Option<PositionExited> {
        match update.current {
            Some(position) => {
                self.positions.insert(instrument, position);
            }
            None => {
                self.positions.remove(&instrument);
            }
        }
        update.exited
    }

    /// Applies `trade` to the position of its instrument.
    pub fn update_from_trade(&mut self, trade: &Trade) -> Option<PositionExited> {
        let update = self.preview(trade);
        self.commit(trade.instrument(), update)
    }

    /// Marks the open position of `instrument`, if any, to `price`.
    pub fn update_price(&mut self, instrument: InstrumentIndex, price: Decimal) {
        if let Some(position) = self.positions.get_mut(&instrument) {
            position.update_pnl_unrealised(price);
        }
    }

    /// Returns the signed quantity of every open position.
    #[must_use]
    pub fn quantities(&self) -> Vec<(InstrumentIndex, Decimal)> {
        self.positions
            .iter()
            .map(|(instrument, position)| (*instrument, position.quantity_signed()))
            .collect()
    }

    /// Returns an iterator over the open positions, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
