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

//! Provides limit configuration for `LimitsRiskManager` instances.

use meridian_model::identifiers::InstrumentIndex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors raised when validating a risk configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskLimitsError {
    #[error("Invalid risk limit {field}: must be positive, was {value}")]
    NonPositive { field: &'static str, value: Decimal },
    #[error("Invalid risk limit max_exposure_percent: must be in (0, 1], was {0}")]
    ExposureOutOfRange(Decimal),
    #[error("Risk limits configured for {instrument} but only {num_instruments} instruments exist")]
    UnknownInstrument {
        instrument: InstrumentIndex,
        num_instruments: usize,
    },
}

/// Limits applied to open requests. An unset limit is not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    /// Maximum ratio of gross notional across all instruments to account equity.
    pub max_leverage: Option<Decimal>,
    /// Maximum absolute notional of a single instrument position, in the quote asset.
    pub max_position_notional: Option<Decimal>,
    /// Maximum share of account equity a single instrument position may represent.
    pub max_exposure_percent: Option<Decimal>,
    /// Maximum absolute quantity of a single instrument position.
    pub max_position_quantity: Option<Decimal>,
}

impl RiskLimits {
    /// Validates the configured limits.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_leverage`, `max_position_notional` or `max_position_quantity` is not positive.
    /// - `max_exposure_percent` is outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), RiskLimitsError> {
        let positive = [
            ("max_leverage", self.max_leverage),
            ("max_position_notional", self.max_position_notional),
            ("max_position_quantity", self.max_position_quantity),
        ];
        for (field, limit) in positive {
            if let Some(value) = limit
                && value <= Decimal::ZERO
            {
                return Err(RiskLimitsError::NonPositive { field, value });
            }
        }

        if let Some(value) = self.max_exposure_percent
            && (value <= Decimal::ZERO || value > Decimal::ONE)
        {
            return Err(RiskLimitsError::ExposureOutOfRange(value));
        }

        Ok(())
    }

    /// Returns these limits with every field set in `overrides` replaced.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        Self {
            max_leverage: overrides.max_leverage.or(self.max_leverage),
            max_position_notional: overrides.max_position_notional.or(self.max_position_notional),
            max_exposure_percent: overrides.max_exposure_percent.or(self.max_exposure_percent),
            max_position_quantity: overrides.max_position_quantity.or(self.max_position_quantity),
        }
    }

    /// Returns whether no limit is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.max_leverage.is_none()
            && self.max_position_notional.is_none()
            && self.max_exposure_percent.is_none()
            && self.max_position_quantity.is_none()
    }
}

/// Limits overriding the global limits for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRiskLimits {
    pub instrument: InstrumentIndex,
    #[serde(flatten)]
    pub limits: RiskLimits,
}

/// Global limits plus per-instrument overrides, kept sorted by instrument index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfiguration {
    pub global: RiskLimits,
    instruments: Vec<InstrumentRiskLimits>,
}

impl RiskConfiguration {
    /// Creates a new [`RiskConfiguration`] instance with no instrument overrides.
    #[must_use]
    pub const fn new(global: RiskLimits) -> Self {
        Self {
            global,
            instruments: Vec::new(),
        }
    }

    /// Sets the override limits of `instrument`, or removes them when `limits` is `None`.
    pub fn set_instrument_limits(&mut self, instrument: InstrumentIndex, limits: Option<RiskLimits>) {
        let position = self
            .instruments
            .binary_search_by_key(&instrument, |entry| entry.instrument);

        match (position, limits) {
            (Ok(index), Some(limits)) => self.instruments[index].limits = limits,
            (Ok(index), None) => {
                self.instruments.remove(index);
            }
            (Err(index), Some(limits)) => self
                .instruments
                .insert(index, InstrumentRiskLimits { instrument, limits }),
            (Err(_), None) => {}
        }
    }

    /// Returns the override limits of `instrument`, if any.
    #[must_use]
    pub fn instrument_limits(&self, instrument: InstrumentIndex) -> Option<&RiskLimits> {
        self.instruments
            .binary_search_by_key(&instrument, |entry| entry.instrument)
            .ok()
            .map(|index| &self.instruments[index].limits)
    }

    /// Returns the effective limits of `instrument`: its overrides merged over the global limits.
    #[must_use]
    pub fn limits_for(&self, instrument: InstrumentIndex) -> RiskLimits {
        match self.instrument_limits(instrument) {
            Some(overrides) => self.global.merge(overrides),
            None => self.global,
        }
    }

    /// Returns the per-instrument overrides in instrument order.
    #[must_use]
    pub fn instruments(&self) -> &[InstrumentRiskLimits] {
        &self.instruments
    }

    /// Validates every configured limit against a registry of `num_instruments` instruments.
    ///
    /// # Errors
    ///
    /// Returns an error if any limit is invalid or refers to an unknown instrument.
    pub fn validate(&self, num_instruments: usize) -> Result<(), RiskLimitsError> {
        self.global.validate()?;
        for entry in &self.instruments {
            if entry.instrument.index() >= num_instruments {
                return Err(RiskLimitsError::UnknownInstrument {
                    instrument: entry.instrument,
                    num_instruments,
                });
            }
            entry.limits.validate()?;
        }
        Ok(())
    }

    /// Restores the sorted, deduplicated order of instrument overrides after deserialization.
    ///
    /// When an instrument repeats, the last entry wins.
    pub fn normalize(&mut self) {
        let entries = std::mem::take(&mut self.instruments);
        for entry in entries {
            self.set_instrument_limits(entry.instrument, Some(entry.limits));
        }
    }
}
