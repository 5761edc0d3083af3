//! Read-only views. Each call takes a fresh price snapshot, nothing is cached
//! between calls.

use super::core::Engine;
use super::results::{AccountInformation, EngineError, SystemTotals};
use crate::health::{self, HealthParams, HealthStatus};
use crate::ledger::AccountPosition;
use crate::token::StableToken;
use crate::types::{AccountId, Amount, AssetId, Bps, FeedId, HealthFactor, UsdValue};
use std::rc::Rc;

impl Engine {
    /// USD value of `amount` of `asset` at the current feed price.
    pub fn get_usd_value(&self, asset: AssetId, amount: Amount) -> Result<UsdValue, EngineError> {
        Ok(self.prices().usd_value(asset, amount)?)
    }

    /// Collateral of `asset` that `usd` buys, floored.
    pub fn get_token_amount_from_usd(&self, asset: AssetId, usd: UsdValue) -> Result<Amount, EngineError> {
        Ok(self.prices().token_amount_from_usd(asset, usd)?)
    }

    pub fn get_account_information(&self, account: AccountId) -> Result<AccountInformation, EngineError> {
        let position = self.ledger.position(account);
        let collateral_value = self.prices().total_collateral_usd(position)?;
        Ok(AccountInformation {
            debt_minted: position.debt_minted,
            collateral_value,
        })
    }

    pub fn account_collateral_value(&self, account: AccountId) -> Result<UsdValue, EngineError> {
        Ok(self.prices().total_collateral_usd(self.ledger.position(account))?)
    }

    /// `HealthFactor::MAX` for an account without debt.
    pub fn get_health_factor(&self, account: AccountId) -> Result<HealthFactor, EngineError> {
        self.health_factor_of(self.ledger.position(account), &mut self.prices())
    }

    pub fn health_status(&self, account: AccountId) -> Result<HealthStatus, EngineError> {
        let position = self.ledger.position(account);
        if position.debt_minted.is_zero() {
            return Ok(HealthStatus::NoDebt);
        }
        let collateral_value = self.prices().total_collateral_usd(position)?;
        Ok(health::evaluate_health(position.debt_minted, collateral_value, &self.params)?)
    }

    pub fn is_liquidatable(&self, account: AccountId) -> Result<bool, EngineError> {
        Ok(self.health_status(account)?.is_liquidatable())
    }

    /// How much more `account` could mint right now.
    pub fn max_mintable(&self, account: AccountId) -> Result<Amount, EngineError> {
        let position = self.ledger.position(account);
        let collateral_value = self.prices().total_collateral_usd(position)?;
        Ok(health::max_mintable(position.debt_minted, collateral_value, &self.params)?)
    }

    /// The raw health factor formula, without touching the ledger.
    pub fn calculate_health_factor(&self, debt: Amount, collateral_usd: UsdValue) -> Result<HealthFactor, EngineError> {
        Ok(health::calculate_health_factor(
            debt,
            collateral_usd,
            self.params.liquidation_threshold,
        )?)
    }

    pub fn collateral_balance(&self, account: AccountId, asset: AssetId) -> Amount {
        self.ledger.collateral_balance(account, asset)
    }

    pub fn debt_of(&self, account: AccountId) -> Amount {
        self.ledger.debt_of(account)
    }

    pub fn position(&self, account: AccountId) -> &AccountPosition {
        self.ledger.position(account)
    }

    pub fn collateral_assets(&self) -> Vec<AssetId> {
        self.registry.asset_ids().collect()
    }

    pub fn price_feed_of(&self, asset: AssetId) -> Result<FeedId, EngineError> {
        Ok(self.registry.feed_id_for(asset)?)
    }

    pub fn stable_token(&self) -> &Rc<dyn StableToken> {
        &self.stable
    }

    pub fn usd_decimals(&self) -> u8 {
        self.usd_decimals
    }

    pub fn health_params(&self) -> &HealthParams {
        &self.params
    }

    pub fn liquidation_threshold(&self) -> Bps {
        self.params.liquidation_threshold
    }

    pub fn liquidation_bonus(&self) -> Bps {
        self.params.liquidation_bonus
    }

    pub fn min_health_factor(&self) -> HealthFactor {
        self.params.min_health_factor
    }

    /// Fixed-point scale of health factors.
    pub fn precision(&self) -> u128 {
        HealthFactor::PRECISION
    }

    /// Debt and collateral summed over every open position, priced with one snapshot.
    pub fn system_totals(&self) -> Result<SystemTotals, EngineError> {
        let mut prices = self.prices();
        let mut total_debt = Amount::ZERO;
        let mut total_collateral_value = UsdValue::ZERO;
        let mut accounts = 0;

        for (_, position) in self.ledger.accounts() {
            total_debt = total_debt.checked_add(position.debt_minted)?;
            total_collateral_value = total_collateral_value.checked_add(prices.total_collateral_usd(position)?)?;
            accounts += 1;
        }

        Ok(SystemTotals {
            total_debt,
            total_collateral_value,
            accounts,
        })
    }
}
