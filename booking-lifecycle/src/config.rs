//! Configuration for the booking lifecycle

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Commission owed to the travel agent, as a fraction of the settled bill
pub const DEFAULT_COMMISSION_RATE: Decimal = dec!(0.02);

/// Commission rate, always within `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct CommissionRate(Decimal);

impl CommissionRate {
    /// Validate a rate
    pub fn new(rate: Decimal) -> crate::Result<Self> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(crate::Error::Config(format!(
                "commission rate {} outside [0, 1]",
                rate
            )));
        }
        Ok(Self(rate))
    }

    /// Rate as a fraction
    pub fn rate(&self) -> Decimal {
        self.0
    }

    /// Commission on a settled bill
    pub fn commission_on(&self, total_bill: Decimal) -> Decimal {
        // |rate| <= 1, so the product cannot overflow
        total_bill * self.0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        Self(DEFAULT_COMMISSION_RATE)
    }
}

impl TryFrom<Decimal> for CommissionRate {
    type Error = crate::Error;

    fn try_from(rate: Decimal) -> crate::Result<Self> {
        Self::new(rate)
    }
}

impl From<CommissionRate> for Decimal {
    fn from(rate: CommissionRate) -> Self {
        rate.0
    }
}

/// Lifecycle service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Commission rate applied by `updatePayables`
    pub commission_rate: CommissionRate,

    /// Ledger backend
    pub ledger: LedgerBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "booking-lifecycle".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            commission_rate: CommissionRate::default(),
            ledger: LedgerBackend::default(),
        }
    }
}

/// Ledger backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum LedgerBackend {
    /// In-process map, lost on exit
    #[default]
    Memory,
    /// RocksDB under a data directory
    Rocksdb(booking_ledger::Config),
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(rate) = std::env::var("BOOKING_COMMISSION_RATE") {
            let rate: Decimal = rate.parse().map_err(|e| {
                crate::Error::Config(format!("BOOKING_COMMISSION_RATE '{}': {}", rate, e))
            })?;
            config.commission_rate = CommissionRate::new(rate)?;
        }

        if let Ok(backend) = std::env::var("BOOKING_LEDGER_BACKEND") {
            config.ledger = match backend.as_str() {
                "memory" => LedgerBackend::Memory,
                "rocksdb" => LedgerBackend::Rocksdb(booking_ledger::Config::from_env()?),
                other => {
                    return Err(crate::Error::Config(format!(
                        "unknown ledger backend '{}'",
                        other
                    )))
                }
            };
        } else if let Ok(dir) = std::env::var("BOOKING_LEDGER_DATA_DIR") {
            let mut ledger = booking_ledger::Config::default();
            ledger.data_dir = PathBuf::from(dir);
            config.ledger = LedgerBackend::Rocksdb(ledger);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> crate::Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(crate::Error::Config("service_name is empty".to_string()));
        }
        if let LedgerBackend::Rocksdb(ledger) = &self.ledger {
            if ledger.data_dir.as_os_str().is_empty() {
                return Err(crate::Error::Config("ledger data_dir is empty".to_string()));
            }
        }
        Ok(())
    }
}
