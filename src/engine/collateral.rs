//! Collateral deposit and redemption.
//!
//! Every operation here and in the sibling modules follows the same order:
//! validate, stage ledger effects in a transaction, check health against the
//! staged state, then call the token collaborators. The ledger only changes
//! once all of that has succeeded.

use super::core::{rejected, Engine};
use super::results::EngineError;
use crate::ledger::Changeset;
use crate::types::{AccountId, Amount, AssetId};
use tracing::debug;

impl Engine {
    /// Lock `amount` of `asset` from `account`. deposits only add backing, so no
    /// health check.
    pub fn deposit_collateral(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), EngineError> {
        let changeset = self
            .stage_deposit(account, asset, amount)
            .map_err(|e| rejected("deposit_collateral", account, e))?;
        self.commit(changeset);

        debug!(%account, %asset, %amount, "collateral deposited");
        Ok(())
    }

    /// Withdraw collateral back to `account`. the remaining position must stay healthy.
    pub fn redeem_collateral(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), EngineError> {
        let changeset = self
            .stage_redeem(account, asset, amount)
            .map_err(|e| rejected("redeem_collateral", account, e))?;
        self.commit(changeset);

        debug!(%account, %asset, %amount, "collateral redeemed");
        Ok(())
    }

    fn stage_deposit(&self, account: AccountId, asset: AssetId, amount: Amount) -> Result<Changeset, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }
        let collateral = self.registry.require(asset)?;

        let mut tx = self.ledger.begin(&self.registry);
        tx.record_deposit(account, asset, amount)?;

        self.settlement()
            .run(|s| s.pull_collateral(collateral, account, amount))?;

        Ok(tx.finish())
    }

    fn stage_redeem(&self, account: AccountId, asset: AssetId, amount: Amount) -> Result<Changeset, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }
        let collateral = self.registry.require(asset)?;

        let mut tx = self.ledger.begin(&self.registry);
        tx.record_redeem(account, account, asset, amount)?;

        let mut prices = self.prices();
        self.ensure_healthy(account, tx.position(account), &mut prices)?;

        self.settlement()
            .run(|s| s.pay_collateral(collateral, account, amount))?;

        Ok(tx.finish())
    }
}
