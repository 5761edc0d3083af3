// 3.0 config.rs: risk settings in one place. threshold, bonus, min health factor.
// 3.1 construction-time validation errors also live here since a bad config and a
// mismatched collateral list fail the same way: before any state exists.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{AssetId, Bps, HealthFactor};

pub const DEFAULT_LIQUIDATION_THRESHOLD_BPS: u32 = 5_000; // 50%, so 200% overcollateralized
pub const DEFAULT_LIQUIDATION_BONUS_BPS: u32 = 1_000; // 10%

/// Largest token/feed precision the engine accepts. keeps 10^decimals well inside u128.
pub const MAX_DECIMALS: u8 = 36;

/** 3.2: solvency parameters. bps are out of 10_000 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    // share of raw collateral value that counts toward backing debt
    pub liquidation_threshold_bps: u32,
    // extra collateral paid to a liquidator on top of the debt they cover
    pub liquidation_bonus_bps: u32,
    // accounts below this are liquidatable
    pub min_health_factor: Decimal,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            liquidation_threshold_bps: DEFAULT_LIQUIDATION_THRESHOLD_BPS,
            liquidation_bonus_bps: DEFAULT_LIQUIDATION_BONUS_BPS,
            min_health_factor: dec!(1),
        }
    }
}

impl RiskParams {
    // Create a preset for testnet: same ratios, cheaper liquidations to exercise keepers
    pub fn testnet() -> Self {
        Self {
            liquidation_bonus_bps: 500, // 5%
            ..Self::default()
        }
    }

    // Create a preset for mainnet with conservative settings
    pub fn mainnet_conservative() -> Self {
        Self {
            liquidation_threshold_bps: 4_000, // 250% overcollateralized
            liquidation_bonus_bps: 500,
            min_health_factor: dec!(1.1),
        }
    }

    // Validate the parameters for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.liquidation_threshold_bps == 0
            || self.liquidation_threshold_bps as u128 > Bps::DENOMINATOR
        {
            return Err(ConfigError::InvalidThreshold(self.liquidation_threshold_bps));
        }

        // a bonus of 100% or more pays the liquidator twice the debt they burn
        if self.liquidation_bonus_bps as u128 >= Bps::DENOMINATOR {
            return Err(ConfigError::InvalidBonus(self.liquidation_bonus_bps));
        }

        if self.min_health_factor < Decimal::ONE
            || HealthFactor::from_decimal(self.min_health_factor).is_none()
        {
            return Err(ConfigError::InvalidMinHealthFactor(self.min_health_factor));
        }

        Ok(())
    }

    pub fn liquidation_threshold(&self) -> Bps {
        Bps::new(self.liquidation_threshold_bps)
    }

    pub fn liquidation_bonus(&self) -> Bps {
        Bps::new(self.liquidation_bonus_bps)
    }

    // None only when validate() would have rejected it
    pub fn min_health_factor(&self) -> Option<HealthFactor> {
        HealthFactor::from_decimal(self.min_health_factor)
    }
}

// Construction and validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("collateral list has {assets} assets but {feeds} price feeds")]
    LengthMismatch { assets: usize, feeds: usize },

    #[error("collateral asset {0} registered twice")]
    DuplicateAsset(AssetId),

    #[error("unsupported precision of {decimals} decimals (max 36)")]
    UnsupportedDecimals { decimals: u8 },

    #[error("liquidation threshold must be in (0, 10000] bps, got {0}")]
    InvalidThreshold(u32),

    #[error("liquidation bonus must be below 10000 bps, got {0}")]
    InvalidBonus(u32),

    #[error("minimum health factor must be at least 1, got {0}")]
    InvalidMinHealthFactor(Decimal),
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn risk_params(&self) -> RiskParams {
        match self {
            Environment::Development => RiskParams::default(),
            Environment::Testnet => RiskParams::testnet(),
            Environment::Mainnet => RiskParams::mainnet_conservative(),
        }
    }
}
