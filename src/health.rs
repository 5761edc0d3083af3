//! Health factor calculation.
//!
//! Only a fraction of collateral value (the liquidation threshold) backs debt:
//!
//! ```text
//! adjusted = collateral_usd * threshold_bps / 10_000
//! health   = adjusted * 1e18 / debt
//! ```
//!
//! An account with no debt is at `HealthFactor::MAX`. Below the minimum health
//! factor an account can be liquidated. All of this is pure and recomputed from
//! current ledger and oracle state on every call.

use crate::config::{ConfigError, RiskParams};
use crate::math::{self, MathError};
use crate::types::{Amount, Bps, HealthFactor, UsdValue};
use serde::{Deserialize, Serialize};

/// Validated risk parameters in the engine's fixed-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthParams {
    pub liquidation_threshold: Bps,
    pub liquidation_bonus: Bps,
    pub min_health_factor: HealthFactor,
}

impl HealthParams {
    pub fn from_risk(params: &RiskParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let min_health_factor = params
            .min_health_factor()
            .ok_or(ConfigError::InvalidMinHealthFactor(params.min_health_factor))?;
        Ok(Self {
            liquidation_threshold: params.liquidation_threshold(),
            liquidation_bonus: params.liquidation_bonus(),
            min_health_factor,
        })
    }
}

impl Default for HealthParams {
    fn default() -> Self {
        Self {
            liquidation_threshold: Bps::new(crate::config::DEFAULT_LIQUIDATION_THRESHOLD_BPS),
            liquidation_bonus: Bps::new(crate::config::DEFAULT_LIQUIDATION_BONUS_BPS),
            min_health_factor: HealthFactor::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    NoDebt,
    Healthy { health_factor: HealthFactor },
    Liquidatable { health_factor: HealthFactor },
}

impl HealthStatus {
    pub fn is_liquidatable(&self) -> bool {
        matches!(self, HealthStatus::Liquidatable { .. })
    }
}

pub fn adjusted_collateral(collateral_usd: UsdValue, threshold: Bps) -> Result<UsdValue, MathError> {
    math::mul_div(collateral_usd.raw(), threshold.value() as u128, Bps::DENOMINATOR).map(UsdValue::new)
}

pub fn calculate_health_factor(
    debt: Amount,
    collateral_usd: UsdValue,
    threshold: Bps,
) -> Result<HealthFactor, MathError> {
    if debt.is_zero() {
        return Ok(HealthFactor::MAX);
    }
    let adjusted = adjusted_collateral(collateral_usd, threshold)?;
    // anything past u128 is indistinguishable from no debt for every comparison we make
    let ratio = math::mul_div_saturating(adjusted.raw(), HealthFactor::PRECISION, debt.raw())?;
    Ok(HealthFactor::from_raw(ratio))
}

pub fn evaluate_health(
    debt: Amount,
    collateral_usd: UsdValue,
    params: &HealthParams,
) -> Result<HealthStatus, MathError> {
    if debt.is_zero() {
        return Ok(HealthStatus::NoDebt);
    }
    let health_factor = calculate_health_factor(debt, collateral_usd, params.liquidation_threshold)?;
    if health_factor < params.min_health_factor {
        Ok(HealthStatus::Liquidatable { health_factor })
    } else {
        Ok(HealthStatus::Healthy { health_factor })
    }
}

/// Additional stable that could be minted before hitting the minimum health factor.
pub fn max_mintable(
    debt: Amount,
    collateral_usd: UsdValue,
    params: &HealthParams,
) -> Result<Amount, MathError> {
    let adjusted = adjusted_collateral(collateral_usd, params.liquidation_threshold)?;
    let debt_ceiling = math::mul_div(
        adjusted.raw(),
        HealthFactor::PRECISION,
        params.min_health_factor.raw(),
    )?;
    Ok(Amount::new(debt_ceiling.saturating_sub(debt.raw())))
}
