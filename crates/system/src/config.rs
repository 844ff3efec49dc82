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

//! Configuration of engines and live systems, loadable from JSON or TOML.

use std::{fs, path::Path, time::Duration};

use meridian_analysis::time::TimeInterval;
use meridian_model::{
    balance::{AssetBalance, Balance, BalanceError},
    identifiers::{AssetName, ExchangeId},
    instruments::{IndexedInstruments, InstrumentConfig, InstrumentError},
};
use meridian_risk::config::{RiskConfiguration, RiskLimitsError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported config file format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),
    #[error("Invalid config: no instruments configured")]
    NoInstruments,
    #[error("Invalid initial balance: unknown asset {exchange}:{asset}")]
    UnknownAsset { exchange: ExchangeId, asset: AssetName },
    #[error("Invalid live config: audit_capacity must be positive")]
    ZeroAuditCapacity,
    #[error(transparent)]
    Instrument(#[from] InstrumentError),
    #[error(transparent)]
    Risk(#[from] RiskLimitsError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
}

/// A balance held before any account event arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialBalance {
    pub exchange: ExchangeId,
    pub asset: AssetName,
    pub total: Decimal,
    pub free: Decimal,
}

/// Configuration of one engine: instruments, risk limits and summary parameters.
///
/// All values are fixed for the lifetime of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Risk-free return per summary interval, used by the Sharpe and Sortino ratios.
    #[serde(default)]
    pub risk_free_return: Decimal,
    /// The interval summaries are scaled to unless another is requested.
    #[serde(default)]
    pub interval: TimeInterval,
    #[serde(default)]
    pub risk: RiskConfiguration,
    pub instruments: Vec<InstrumentConfig>,
    #[serde(default)]
    pub initial_balances: Vec<InitialBalance>,
}

impl SystemConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is malformed or the configuration is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::validated(serde_json::from_str(json)?)
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `toml` is malformed or the configuration is invalid.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::validated(toml::from_str(toml)?)
    }

    /// Loads a configuration file, choosing the format by its `.json` or `.toml` extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has another extension, or holds an
    /// invalid configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let read = || {
            fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        };

        match extension.as_str() {
            "json" => Self::from_json_str(&read()?),
            "toml" => Self::from_toml_str(&read()?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn validated(mut config: Self) -> Result<Self, ConfigError> {
        config.risk.normalize();
        config.validate()?;
        log::debug!(
            "Loaded config with {} instruments, interval {}",
            config.instruments.len(),
            config.interval
        );
        Ok(config)
    }

    /// Validates the configuration, returning the instrument registry it describes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No instruments are configured, or an instrument is invalid.
    /// - A risk limit is invalid or refers to an unknown instrument.
    /// - An initial balance is invalid or refers to an unknown asset.
    pub fn validate(&self) -> Result<IndexedInstruments, ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }
        let instruments = self.build_instruments()?;
        self.risk.validate(instruments.len())?;
        self.resolve_initial_balances(&instruments)?;
        Ok(instruments)
    }

    /// Builds the instrument registry, assigning indices in configuration order.
    ///
    /// # Errors
    ///
    /// Returns an error if an instrument is duplicated or has an invalid contract size.
    pub fn build_instruments(&self) -> Result<IndexedInstruments, ConfigError> {
        Ok(IndexedInstruments::new(self.instruments.iter().cloned())?)
    }

    /// Resolves the initial balances against `instruments`. Their snapshot time is the UNIX epoch,
    /// so any later snapshot supersedes them.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset is not in the registry or a balance is invalid.
    pub fn resolve_initial_balances(
        &self,
        instruments: &IndexedInstruments,
    ) -> Result<Vec<AssetBalance>, ConfigError> {
        self.initial_balances
            .iter()
            .map(|initial| {
                let asset = instruments
                    .find_asset(initial.exchange.as_str(), initial.asset.as_str())
                    .ok_or(ConfigError::UnknownAsset {
                        exchange: initial.exchange,
                        asset: initial.asset,
                    })?;
                let balance = Balance::new_checked(initial.total, initial.free)?;
                Ok(AssetBalance::new(asset, balance, chrono::DateTime::UNIX_EPOCH))
            })
            .collect()
    }
}

/// Configuration of a live system's audit stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Capacity of the audit tick channel; ticks beyond it are dropped.
    pub audit_capacity: usize,
    /// Default wait used by [`AuditReceiver::recv`](crate::live::AuditReceiver::recv).
    pub audit_timeout: Duration,
}

impl Default for LiveConfig {
    /// Creates a new default [`LiveConfig`] instance.
    fn default() -> Self {
        Self {
            audit_capacity: 1024,
            audit_timeout: Duration::from_secs(1),
        }
    }
}

impl LiveConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `audit_capacity` is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.audit_capacity == 0 {
            return Err(ConfigError::ZeroAuditCapacity);
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::io::Write;

    use meridian_model::identifiers::{AssetIndex, InstrumentIndex};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    const JSON: &str = r#"{
        "risk_free_return": "0.0001",
        "interval": "daily",
        "risk": {
            "global": {"max_position_notional": "50000"},
            "instruments": [{"instrument": 1, "max_position_quantity": "10"}]
        },
        "instruments": [
            {"exchange": "BINANCE_SPOT", "name": "binance_spot-btc_usdt", "base": "btc", "quote": "usdt"},
            {"exchange": "BINANCE_SPOT", "name": "binance_spot-eth_usdt", "base": "eth", "quote": "usdt"}
        ],
        "initial_balances": [
            {"exchange": "BINANCE_SPOT", "asset": "usdt", "total": "10000", "free": "10000"}
        ]
    }"#;

    const TOML: &str = r#"
risk_free_return = "0.0001"
interval = "annual_365"

[[instruments]]
exchange = "BINANCE_SPOT"
name = "binance_spot-btc_usdt"
base = "btc"
quote = "usdt"
contract_size = "0.01"
"#;

    #[rstest]
    fn test_from_json_str() {
        let config = SystemConfig::from_json_str(JSON).unwrap();

        assert_eq!(config.risk_free_return, dec!(0.0001));
        assert_eq!(config.interval, TimeInterval::Daily);
        assert_eq!(
            config.risk.limits_for(InstrumentIndex::new(1)).max_position_quantity,
            Some(dec!(10))
        );

        let instruments = config.validate().unwrap();
        let balances = config.resolve_initial_balances(&instruments).unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, AssetIndex::new(1));
        assert_eq!(balances[0].balance.total(), dec!(10000));
    }

    #[rstest]
    fn test_from_toml_str_applies_defaults() {
        let config = SystemConfig::from_toml_str(TOML).unwrap();

        assert_eq!(config.interval, TimeInterval::Annual365);
        assert_eq!(config.risk, RiskConfiguration::default());
        assert!(config.initial_balances.is_empty());
        assert_eq!(config.instruments[0].contract_size, dec!(0.01));
    }

    #[rstest]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON.as_bytes()).unwrap();
        assert!(SystemConfig::load(file.path()).is_ok());

        let yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            SystemConfig::load(yaml.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            SystemConfig::load("/nonexistent/config.toml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[rstest]
    #[case(r#""interval": "daily""#, r#""interval": "weekly""#)]
    #[case(r#""asset": "usdt""#, r#""asset": "usdc""#)]
    #[case(r#""total": "10000""#, r#""total": "1""#)]
    #[case(r#""instrument": 1"#, r#""instrument": 2"#)]
    #[case(r#""max_position_notional": "50000""#, r#""max_position_notional": "0""#)]
    fn test_invalid_configs_rejected(#[case] from: &str, #[case] to: &str) {
        let json = JSON.replace(from, to);
        assert!(SystemConfig::from_json_str(&json).is_err());
    }

    #[rstest]
    fn test_no_instruments_rejected() {
        assert!(matches!(
            SystemConfig::from_json_str(r#"{"instruments": []}"#),
            Err(ConfigError::NoInstruments)
        ));
    }

    #[rstest]
    fn test_live_config() {
        let config: LiveConfig = serde_json::from_str(r#"{"audit_capacity": 8}"#).unwrap();
        assert_eq!(config.audit_capacity, 8);
        assert_eq!(config.audit_timeout, Duration::from_secs(1));
        assert!(config.validate().is_ok());

        let zero = LiveConfig {
            audit_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroAuditCapacity)));
    }
}
