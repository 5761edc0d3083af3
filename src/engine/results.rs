// 8.0.2: result types and errors for engine operations.

use crate::config::ConfigError;
use crate::health::HealthParams;
use crate::ledger::LedgerError;
use crate::math::{self, MathError};
use crate::price_feed::PriceError;
use crate::registry::UnknownAsset;
use crate::types::{AccountId, Amount, AssetId, HealthFactor, UsdValue};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInformation {
    pub debt_minted: Amount,
    pub collateral_value: UsdValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationResult {
    pub liquidator: AccountId,
    pub account: AccountId,
    pub asset: AssetId,
    pub debt_covered: Amount,
    // includes the bonus
    pub collateral_seized: Amount,
    pub bonus: Amount,
    pub health_before: HealthFactor,
    pub health_after: HealthFactor,
}

/// Protocol wide sums, for auditing that outstanding debt stays backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemTotals {
    pub total_debt: Amount,
    pub total_collateral_value: UsdValue,
    pub accounts: usize,
}

impl SystemTotals {
    /// Debt ceiling implied by all collateral at the minimum health factor.
    pub fn debt_ceiling(&self, params: &HealthParams) -> Result<Amount, MathError> {
        let adjusted = crate::health::adjusted_collateral(self.total_collateral_value, params.liquidation_threshold)?;
        math::mul_div(adjusted.raw(), HealthFactor::PRECISION, params.min_health_factor.raw()).map(Amount::new)
    }

    pub fn is_fully_backed(&self, params: &HealthParams) -> Result<bool, MathError> {
        Ok(self.total_debt <= self.debt_ceiling(params)?)
    }
}

// which token a failed transfer touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Collateral(AssetId),
    Stable,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Collateral(asset) => write!(f, "collateral {asset}"),
            TokenKind::Stable => write!(f, "stable"),
        }
    }
}

/// Coarse classification of every engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Value,
    UnknownAsset,
    Configuration,
    TransferFailed,
    MintFailed,
    BurnFailed,
    HealthFactorBroken,
    HealthFactorOk,
    HealthFactorNotImproved,
    Oracle,
    Math,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("insufficient {asset} collateral: requested {requested}, available {available}")]
    InsufficientCollateral {
        asset: AssetId,
        requested: Amount,
        available: Amount,
    },

    #[error("burn of {requested} exceeds outstanding debt {outstanding}")]
    BurnExceedsDebt { requested: Amount, outstanding: Amount },

    #[error("unknown collateral asset {0}")]
    UnknownAsset(AssetId),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{token} transfer of {amount} from {from} to {to} failed")]
    TransferFailed {
        token: TokenKind,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },

    #[error("mint of {amount} to {to} failed")]
    MintFailed { to: AccountId, amount: Amount },

    #[error("burn of {amount} failed")]
    BurnFailed { amount: Amount },

    #[error("health factor of {account} would be {health_factor}, below minimum {minimum}")]
    HealthFactorBroken {
        account: AccountId,
        health_factor: HealthFactor,
        minimum: HealthFactor,
    },

    #[error("{account} is not liquidatable at health factor {health_factor}")]
    HealthFactorOk {
        account: AccountId,
        health_factor: HealthFactor,
    },

    #[error("liquidation left health factor of {account} at {after} (was {before})")]
    HealthFactorNotImproved {
        account: AccountId,
        before: HealthFactor,
        after: HealthFactor,
    },

    #[error("oracle error: {0}")]
    Oracle(PriceError),

    #[error(transparent)]
    Math(#[from] MathError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ZeroAmount
            | EngineError::InsufficientCollateral { .. }
            | EngineError::BurnExceedsDebt { .. } => ErrorKind::Value,
            EngineError::UnknownAsset(_) => ErrorKind::UnknownAsset,
            EngineError::Configuration(_) => ErrorKind::Configuration,
            EngineError::TransferFailed { .. } => ErrorKind::TransferFailed,
            EngineError::MintFailed { .. } => ErrorKind::MintFailed,
            EngineError::BurnFailed { .. } => ErrorKind::BurnFailed,
            EngineError::HealthFactorBroken { .. } => ErrorKind::HealthFactorBroken,
            EngineError::HealthFactorOk { .. } => ErrorKind::HealthFactorOk,
            EngineError::HealthFactorNotImproved { .. } => ErrorKind::HealthFactorNotImproved,
            EngineError::Oracle(_) => ErrorKind::Oracle,
            EngineError::Math(_) => ErrorKind::Math,
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ZeroAmount => EngineError::ZeroAmount,
            LedgerError::UnknownAsset(asset) => EngineError::UnknownAsset(asset),
            LedgerError::InsufficientCollateral {
                asset,
                requested,
                available,
            } => EngineError::InsufficientCollateral {
                asset,
                requested,
                available,
            },
            LedgerError::BurnExceedsDebt {
                requested,
                outstanding,
            } => EngineError::BurnExceedsDebt {
                requested,
                outstanding,
            },
            LedgerError::Math(e) => EngineError::Math(e),
        }
    }
}

impl From<PriceError> for EngineError {
    fn from(err: PriceError) -> Self {
        match err {
            PriceError::UnknownAsset(asset) => EngineError::UnknownAsset(asset),
            PriceError::Math(e) => EngineError::Math(e),
            other => EngineError::Oracle(other),
        }
    }
}

impl From<UnknownAsset> for EngineError {
    fn from(err: UnknownAsset) -> Self {
        EngineError::UnknownAsset(err.0)
    }
}
