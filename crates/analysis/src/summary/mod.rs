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

//! Trading summaries: point-in-time performance snapshots of every instrument and asset.

pub mod asset;
pub mod backtest;
pub mod display;
pub mod instrument;

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use meridian_model::{
    balance::AssetBalance,
    identifiers::InstrumentName,
    instruments::{IndexedInstruments, InstrumentError},
    position::PositionExited,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use self::{
    asset::{TearSheetAsset, TearSheetAssetGenerator},
    instrument::{TearSheet, TearSheetGenerator},
};
use crate::time::TimeInterval;

/// Performance snapshot of a trading session.
///
/// Instruments are keyed by name and assets by `"{exchange}:{asset}"`, both in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSummary {
    pub time_engine_start: DateTime<Utc>,
    pub time_engine_end: DateTime<Utc>,
    pub instruments: IndexMap<InstrumentName, TearSheet>,
    pub assets: IndexMap<String, TearSheetAsset>,
}

impl TradingSummary {
    /// Returns `time_engine_end - time_engine_start`.
    #[must_use]
    pub fn trading_duration(&self) -> TimeDelta {
        self.time_engine_end - self.time_engine_start
    }

    /// Writes the summary to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create summary file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a summary previously written with [`TradingSummary::write_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or does not hold a valid summary.
    pub fn read_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open summary file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse summary file {}", path.display()))
    }
}

/// Accumulates the statistics behind a [`TradingSummary`].
///
/// Engine time starts at the first update and never regresses. Before any update both
/// engine times are reported as the UNIX epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingSummaryGenerator {
    pub risk_free_return: Decimal,
    pub interval: TimeInterval,
    pub time_engine_start: Option<DateTime<Utc>>,
    pub time_engine_now: Option<DateTime<Utc>>,
    instrument_names: Vec<InstrumentName>,
    asset_keys: Vec<String>,
    instruments: Vec<TearSheetGenerator>,
    assets: Vec<TearSheetAssetGenerator>,
}

impl TradingSummaryGenerator {
    /// Creates a generator with an empty tear sheet for every instrument and asset of the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset of the registry references an unknown exchange.
    pub fn new(
        risk_free_return: Decimal,
        interval: TimeInterval,
        instruments: &IndexedInstruments,
    ) -> Result<Self, InstrumentError> {
        let instrument_names = instruments
            .instruments()
            .map(|(_, instrument)| instrument.name)
            .collect::<Vec<_>>();
        let asset_keys = instruments
            .assets()
            .map(|(index, _)| instruments.asset_key(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            risk_free_return,
            interval,
            time_engine_start: None,
            time_engine_now: None,
            instruments: vec![TearSheetGenerator::default(); instrument_names.len()],
            assets: vec![TearSheetAssetGenerator::default(); asset_keys.len()],
            instrument_names,
            asset_keys,
        })
    }

    /// Advances engine time to `time` if it is later than the current engine time.
    pub fn update_time_now(&mut self, time: DateTime<Utc>) {
        self.time_engine_start.get_or_insert(time);
        self.time_engine_now = Some(self.time_engine_now.map_or(time, |now| now.max(time)));
    }

    /// Updates the instrument tear sheet of an exited position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position's instrument is not in the registry.
    pub fn update_from_position(&mut self, position: &PositionExited) -> Result<(), InstrumentError> {
        self.instruments
            .get_mut(position.instrument.index())
            .ok_or(InstrumentError::UnknownInstrument(position.instrument))?
            .update_from_position(position);
        Ok(())
    }

    /// Updates the asset tear sheet of a balance snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance's asset is not in the registry.
    pub fn update_from_balance(&mut self, balance: &AssetBalance) -> Result<(), InstrumentError> {
        self.assets
            .get_mut(balance.asset.index())
            .ok_or(InstrumentError::UnknownAsset(balance.asset))?
            .update_from_balance(balance);
        Ok(())
    }

    /// Generates a [`TradingSummary`] of the current statistics scaled to `interval`,
    /// or to the generator's configured interval if `None`.
    #[must_use]
    pub fn generate(&self, interval: Option<TimeInterval>) -> TradingSummary {
        let interval = interval.unwrap_or(self.interval);
        let time_engine_start = self.time_engine_start.unwrap_or_default();
        let time_engine_end = self.time_engine_now.unwrap_or_default();
        let trading_period = time_engine_end - time_engine_start;

        let instruments = self
            .instrument_names
            .iter()
            .zip(&self.instruments)
            .map(|(name, generator)| {
                let sheet = generator.generate(self.risk_free_return, trading_period, interval);
                (*name, sheet)
            })
            .collect();

        let assets = self
            .asset_keys
            .iter()
            .zip(&self.assets)
            .map(|(key, generator)| (key.clone(), generator.generate()))
            .collect();

        TradingSummary {
            time_engine_start,
            time_engine_end,
            instruments,
            assets,
        }
    }
}
