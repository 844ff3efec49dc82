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

//! Instrument definitions and the indexed instrument registry.
//!
//! Engine state and statistics address exchanges, assets and instruments by dense indices.
//! [`IndexedInstruments`] owns the mapping from those indices back to names.

use ahash::AHashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identifiers::{
    AssetIndex, AssetName, ExchangeId, ExchangeIndex, InstrumentIndex, InstrumentName,
};

/// Errors raised while building or querying an instrument registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InstrumentError {
    #[error("Duplicate instrument name: {0}")]
    DuplicateInstrument(InstrumentName),
    #[error("Invalid contract size for {name}: must be positive, was {contract_size}")]
    InvalidContractSize {
        name: InstrumentName,
        contract_size: Decimal,
    },
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(InstrumentIndex),
    #[error("Unknown asset: {0}")]
    UnknownAsset(AssetIndex),
}

/// Configuration of one tradable instrument, as loaded from a system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub exchange: ExchangeId,
    pub name: InstrumentName,
    pub base: AssetName,
    pub quote: AssetName,
    #[serde(default = "default_contract_size")]
    pub contract_size: Decimal,
}

const fn default_contract_size() -> Decimal {
    Decimal::ONE
}

/// An asset held on a specific exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeAsset {
    pub exchange: ExchangeIndex,
    pub name: AssetName,
}

/// A tradable instrument with its registry indices resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub exchange: ExchangeIndex,
    pub name: InstrumentName,
    pub base: AssetIndex,
    pub quote: AssetIndex,
    pub contract_size: Decimal,
}

/// Registry of exchanges, assets and instruments addressed by dense indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedInstruments {
    exchanges: Vec<ExchangeId>,
    assets: Vec<ExchangeAsset>,
    instruments: Vec<Instrument>,
}

impl IndexedInstruments {
    /// Builds a registry from instrument configurations, assigning indices in input order.
    ///
    /// Exchanges and assets are deduplicated; each `(exchange, asset)` pair receives one index.
    ///
    /// # Errors
    ///
    /// Returns an error if an instrument name repeats or a contract size is not positive.
    pub fn new<I>(configs: I) -> Result<Self, InstrumentError>
    where
        I: IntoIterator<Item = InstrumentConfig>,
    {
        let mut registry = Self::default();
        let mut exchange_lookup: AHashMap<ExchangeId, ExchangeIndex> = AHashMap::new();
        let mut asset_lookup: AHashMap<(ExchangeIndex, AssetName), AssetIndex> = AHashMap::new();
        let mut names: AHashMap<InstrumentName, InstrumentIndex> = AHashMap::new();

        for config in configs {
            if config.contract_size <= Decimal::ZERO {
                return Err(InstrumentError::InvalidContractSize {
                    name: config.name,
                    contract_size: config.contract_size,
                });
            }

            let exchange = *exchange_lookup.entry(config.exchange).or_insert_with(|| {
                registry.exchanges.push(config.exchange);
                ExchangeIndex::new(registry.exchanges.len() - 1)
            });

            let mut asset_index = |name: AssetName| {
                *asset_lookup.entry((exchange, name)).or_insert_with(|| {
                    registry.assets.push(ExchangeAsset { exchange, name });
                    AssetIndex::new(registry.assets.len() - 1)
                })
            };
            let base = asset_index(config.base);
            let quote = asset_index(config.quote);

            let index = InstrumentIndex::new(registry.instruments.len());
            if names.insert(config.name, index).is_some() {
                return Err(InstrumentError::DuplicateInstrument(config.name));
            }

            registry.instruments.push(Instrument {
                exchange,
                name: config.name,
                base,
                quote,
                contract_size: config.contract_size,
            });
        }

        Ok(registry)
    }

    /// Returns the instrument at `index`.
    #[must_use]
    pub fn instrument(&self, index: InstrumentIndex) -> Option<&Instrument> {
        self.instruments.get(index.index())
    }

    /// Returns the instrument at `index`, or an error naming the unknown index.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds.
    pub fn instrument_checked(&self, index: InstrumentIndex) -> Result<&Instrument, InstrumentError> {
        self.instrument(index)
            .ok_or(InstrumentError::UnknownInstrument(index))
    }

    /// Returns the asset at `index`.
    #[must_use]
    pub fn asset(&self, index: AssetIndex) -> Option<&ExchangeAsset> {
        self.assets.get(index.index())
    }

    /// Returns the exchange at `index`.
    #[must_use]
    pub fn exchange(&self, index: ExchangeIndex) -> Option<ExchangeId> {
        self.exchanges.get(index.index()).copied()
    }

    /// Returns the summary key of the asset at `index` in the form `"exchange:asset"`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` (or its exchange) is out of bounds.
    pub fn asset_key(&self, index: AssetIndex) -> Result<String, InstrumentError> {
        let asset = self.asset(index).ok_or(InstrumentError::UnknownAsset(index))?;
        let exchange = self
            .exchange(asset.exchange)
            .ok_or(InstrumentError::UnknownAsset(index))?;
        Ok(format!("{exchange}:{}", asset.name))
    }

    /// Finds the index of the instrument with the given name.
    #[must_use]
    pub fn find_instrument(&self, name: &str) -> Option<InstrumentIndex> {
        self.instruments
            .iter()
            .position(|instrument| instrument.name.as_str() == name)
            .map(InstrumentIndex::new)
    }

    /// Finds the index of the asset `name` held on exchange `exchange`.
    #[must_use]
    pub fn find_asset(&self, exchange: &str, name: &str) -> Option<AssetIndex> {
        self.assets
            .iter()
            .position(|asset| {
                asset.name.as_str() == name
                    && self
                        .exchange(asset.exchange)
                        .is_some_and(|id| id.as_str() == exchange)
            })
            .map(AssetIndex::new)
    }

    /// Returns an iterator over all instruments with their indices.
    pub fn instruments(&self) -> impl Iterator<Item = (InstrumentIndex, &Instrument)> {
        self.instruments
            .iter()
            .enumerate()
            .map(|(index, instrument)| (InstrumentIndex::new(index), instrument))
    }

    /// Returns an iterator over all assets with their indices.
    pub fn assets(&self) -> impl Iterator<Item = (AssetIndex, &ExchangeAsset)> {
        self.assets
            .iter()
            .enumerate()
            .map(|(index, asset)| (AssetIndex::new(index), asset))
    }

    /// Returns the number of instruments in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Returns whether the registry contains no instruments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
