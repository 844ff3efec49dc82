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

//! Engine state: orders, positions, balances and last market prices.

pub mod orders;
pub mod positions;

use meridian_model::{
    balance::AssetBalance,
    identifiers::{AssetIndex, InstrumentIndex},
    instruments::{IndexedInstruments, Instrument},
};
use meridian_risk::limits::ExposureState;
use rust_decimal::Decimal;

use self::{orders::OrderManager, positions::PositionManager};
use crate::error::EngineError;

/// The mutable state of one engine, addressed by the indices of its instrument registry.
#[derive(Debug, Clone)]
pub struct EngineState {
    instruments: IndexedInstruments,
    orders: OrderManager,
    positions: PositionManager,
    balances: Vec<Option<AssetBalance>>,
    last_prices: Vec<Option<Decimal>>,
}

impl EngineState {
    /// Creates a new [`EngineState`] instance with no orders, positions, balances or prices.
    #[must_use]
    pub fn new(instruments: IndexedInstruments) -> Self {
        let num_assets = instruments.assets().count();
        let num_instruments = instruments.len();
        Self {
            instruments,
            orders: OrderManager::new(),
            positions: PositionManager::new(),
            balances: vec![None; num_assets],
            last_prices: vec![None; num_instruments],
        }
    }

    #[must_use]
    pub const fn instruments(&self) -> &IndexedInstruments {
        &self.instruments
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderManager {
        &self.orders
    }

    pub(crate) const fn orders_mut(&mut self) -> &mut OrderManager {
        &mut self.orders
    }

    #[must_use]
    pub const fn positions(&self) -> &PositionManager {
        &self.positions
    }

    pub(crate) const fn positions_mut(&mut self) -> &mut PositionManager {
        &mut self.positions
    }

    /// Returns the latest balance snapshot of `asset`.
    #[must_use]
    pub fn balance(&self, asset: AssetIndex) -> Option<&AssetBalance> {
        self.balances.get(asset.index()).and_then(Option::as_ref)
    }

    /// Returns an iterator over the latest balance snapshot of every asset that has one.
    pub fn balances(&self) -> impl Iterator<Item = &AssetBalance> {
        self.balances.iter().flatten()
    }

    /// Returns the last known market price of `instrument`.
    #[must_use]
    pub fn last_price(&self, instrument: InstrumentIndex) -> Option<Decimal> {
        self.last_prices.get(instrument.index()).copied().flatten()
    }

    /// Returns an error if `asset` is not in the registry.
    pub(crate) fn check_asset(&self, asset: AssetIndex) -> Result<(), EngineError> {
        if asset.index() < self.balances.len() {
            Ok(())
        } else {
            Err(EngineError::UnknownAsset(asset))
        }
    }

    /// Returns the registered instrument at `instrument`, or an error if it is unknown.
    pub(crate) fn check_instrument(
        &self,
        instrument: InstrumentIndex,
    ) -> Result<&Instrument, EngineError> {
        self.instruments
            .instrument(instrument)
            .ok_or(EngineError::UnknownInstrument(instrument))
    }

    /// Stores `balance` unless a later snapshot of the same asset is already held.
    ///
    /// Returns whether the snapshot was stored.
    pub(crate) fn set_balance(&mut self, balance: AssetBalance) -> Result<bool, EngineError> {
        self.check_asset(balance.asset)?;
        let slot = &mut self.balances[balance.asset.index()];
        if let Some(current) = slot
            && current.time_exchange > balance.time_exchange
        {
            log::debug!(
                "Ignoring stale balance snapshot for {} at {}",
                balance.asset,
                balance.time_exchange
            );
            return Ok(false);
        }
        *slot = Some(balance);
        Ok(true)
    }

    /// Records the last market price of `instrument` and marks its open position.
    pub(crate) fn set_last_price(
        &mut self,
        instrument: InstrumentIndex,
        price: Decimal,
    ) -> Result<(), EngineError> {
        self.check_instrument(instrument)?;
        self.last_prices[instrument.index()] = Some(price);
        self.positions.update_price(instrument, price);
        Ok(())
    }

    /// Returns the account equity valued in the quote asset of the registry's instruments.
    ///
    /// Quote assets count at face value and base assets at the last price of an instrument
    /// quoting them. Assets that cannot be valued are skipped. Returns `None` if no balance
    /// could be valued.
    #[must_use]
    pub fn equity(&self) -> Option<Decimal> {
        self.balances()
            .filter_map(|balance| self.asset_value(balance.asset, balance.balance.total()))
            .reduce(|total, value| total + value)
    }

    fn asset_value(&self, asset: AssetIndex, amount: Decimal) -> Option<Decimal> {
        if self
            .instruments
            .instruments()
            .any(|(_, instrument)| instrument.quote == asset)
        {
            return Some(amount);
        }

        self.instruments
            .instruments()
            .filter(|(_, instrument)| instrument.base == asset)
            .find_map(|(index, _)| self.last_price(index))
            .and_then(|price| amount.checked_mul(price))
    }
}

impl ExposureState for EngineState {
    fn instrument(&self, index: InstrumentIndex) -> Option<&Instrument> {
        self.instruments.instrument(index)
    }

    fn position_quantities(&self) -> Vec<(InstrumentIndex, Decimal)> {
        self.positions.quantities()
    }

    fn pending_quantities(&self) -> Vec<(InstrumentIndex, Decimal)> {
        self.orders.pending_quantities()
    }

    fn last_price(&self, index: InstrumentIndex) -> Option<Decimal> {
        Self::last_price(self, index)
    }

    fn equity(&self) -> Option<Decimal> {
        Self::equity(self)
    }
}
