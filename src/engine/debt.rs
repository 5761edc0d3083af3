//! Minting and burning the stable asset, plus the combined collateral+debt operations.

use super::core::{rejected, Engine};
use super::results::EngineError;
use crate::ledger::Changeset;
use crate::types::{AccountId, Amount, AssetId};
use tracing::debug;

impl Engine {
    /// Mint `amount` of stable to `account` against its collateral.
    pub fn mint_stable(&mut self, account: AccountId, amount: Amount) -> Result<(), EngineError> {
        let changeset = self
            .stage_mint(account, amount)
            .map_err(|e| rejected("mint_stable", account, e))?;
        self.commit(changeset);

        debug!(%account, %amount, "stable minted");
        Ok(())
    }

    /// Repay `amount` of `account`'s debt with its own stable.
    pub fn burn_stable(&mut self, account: AccountId, amount: Amount) -> Result<(), EngineError> {
        let changeset = self
            .stage_burn(account, amount)
            .map_err(|e| rejected("burn_stable", account, e))?;
        self.commit(changeset);

        debug!(%account, %amount, "debt burned");
        Ok(())
    }

    /// Deposit and mint in one step. Either both happen or neither does.
    pub fn deposit_collateral_and_mint(
        &mut self,
        account: AccountId,
        asset: AssetId,
        collateral_amount: Amount,
        mint_amount: Amount,
    ) -> Result<(), EngineError> {
        let changeset = self
            .stage_deposit_and_mint(account, asset, collateral_amount, mint_amount)
            .map_err(|e| rejected("deposit_collateral_and_mint", account, e))?;
        self.commit(changeset);

        debug!(%account, %asset, %collateral_amount, %mint_amount, "collateral deposited and stable minted");
        Ok(())
    }

    /// Burn debt and withdraw collateral in one step.
    pub fn redeem_collateral_for_stable(
        &mut self,
        account: AccountId,
        asset: AssetId,
        collateral_amount: Amount,
        burn_amount: Amount,
    ) -> Result<(), EngineError> {
        let changeset = self
            .stage_redeem_for_stable(account, asset, collateral_amount, burn_amount)
            .map_err(|e| rejected("redeem_collateral_for_stable", account, e))?;
        self.commit(changeset);

        debug!(%account, %asset, %collateral_amount, %burn_amount, "debt burned and collateral redeemed");
        Ok(())
    }

    fn stage_mint(&self, account: AccountId, amount: Amount) -> Result<Changeset, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }

        let mut tx = self.ledger.begin(&self.registry);
        tx.record_mint(account, amount)?;

        let mut prices = self.prices();
        self.ensure_healthy(account, tx.position(account), &mut prices)?;

        self.settlement().run(|s| s.mint_stable(account, amount))?;

        Ok(tx.finish())
    }

    fn stage_burn(&self, account: AccountId, amount: Amount) -> Result<Changeset, EngineError> {
        if amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }

        let mut tx = self.ledger.begin(&self.registry);
        tx.record_burn(account, amount)?;

        let mut prices = self.prices();
        self.ensure_healthy(account, tx.position(account), &mut prices)?;

        self.settlement().run(|s| {
            s.pull_stable(account, amount)?;
            s.burn_stable(amount)
        })?;

        Ok(tx.finish())
    }

    fn stage_deposit_and_mint(
        &self,
        account: AccountId,
        asset: AssetId,
        collateral_amount: Amount,
        mint_amount: Amount,
    ) -> Result<Changeset, EngineError> {
        if collateral_amount.is_zero() || mint_amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }
        let collateral = self.registry.require(asset)?;

        let mut tx = self.ledger.begin(&self.registry);
        tx.record_deposit(account, asset, collateral_amount)?;
        tx.record_mint(account, mint_amount)?;

        let mut prices = self.prices();
        self.ensure_healthy(account, tx.position(account), &mut prices)?;

        self.settlement().run(|s| {
            s.pull_collateral(collateral, account, collateral_amount)?;
            s.mint_stable(account, mint_amount)
        })?;

        Ok(tx.finish())
    }

    fn stage_redeem_for_stable(
        &self,
        account: AccountId,
        asset: AssetId,
        collateral_amount: Amount,
        burn_amount: Amount,
    ) -> Result<Changeset, EngineError> {
        if collateral_amount.is_zero() || burn_amount.is_zero() {
            return Err(EngineError::ZeroAmount);
        }
        let collateral = self.registry.require(asset)?;

        let mut tx = self.ledger.begin(&self.registry);
        tx.record_burn(account, burn_amount)?;
        tx.record_redeem(account, account, asset, collateral_amount)?;

        let mut prices = self.prices();
        self.ensure_healthy(account, tx.position(account), &mut prices)?;

        self.settlement().run(|s| {
            s.pull_stable(account, burn_amount)?;
            s.burn_stable(burn_amount)?;
            s.pay_collateral(collateral, account, collateral_amount)
        })?;

        Ok(tx.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;
    use crate::engine::ErrorKind;
    use crate::token::StableToken;

    fn with_collateral(weth_units: u128) -> Harness {
        let mut h = Harness::new();
        h.fund(ALICE, weth_units);
        h.engine.deposit_collateral(ALICE, WETH, units(weth_units)).unwrap();
        h
    }

    #[test]
    fn mint_up_to_threshold() {
        let mut h = with_collateral(10); // 20k usd

        h.engine.mint_stable(ALICE, units(10_000)).unwrap();

        assert_eq!(h.engine.debt_of(ALICE), units(10_000));
        assert_eq!(h.stable.balance_of(ALICE), units(10_000));
        assert_eq!(h.engine.get_health_factor(ALICE).unwrap(), crate::types::HealthFactor::ONE);
    }

    #[test]
    fn mint_zero_rejected_regardless_of_collateral() {
        let mut h = with_collateral(10);
        assert_eq!(h.engine.mint_stable(ALICE, Amount::ZERO), Err(EngineError::ZeroAmount));

        let mut empty = Harness::new();
        assert_eq!(empty.engine.mint_stable(BOB, Amount::ZERO), Err(EngineError::ZeroAmount));
    }

    #[test]
    fn mint_past_threshold_is_a_no_op() {
        let mut h = with_collateral(10);
        let before = h.engine.position(ALICE).clone();

        let err = h.engine.mint_stable(ALICE, Amount::new(units(10_000).raw() + 1)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::HealthFactorBroken);
        assert_eq!(h.engine.position(ALICE), &before);
        assert_eq!(h.stable.total_supply(), Amount::ZERO);
    }

    #[test]
    fn failed_mint_is_a_no_op() {
        let mut h = with_collateral(10);
        let before = h.engine.position(ALICE).clone();
        let events_before = h.engine.events().len();
        h.stable.set_fail_mint(true);

        let err = h.engine.mint_stable(ALICE, units(100)).unwrap_err();

        assert_eq!(err, EngineError::MintFailed { to: ALICE, amount: units(100) });
        assert_eq!(h.engine.position(ALICE), &before);
        assert_eq!(h.engine.events().len(), events_before);
    }

    #[test]
    fn burn_repays_debt() {
        let mut h = with_collateral(10);
        h.engine.mint_stable(ALICE, units(5_000)).unwrap();

        h.engine.burn_stable(ALICE, units(2_000)).unwrap();

        assert_eq!(h.engine.debt_of(ALICE), units(3_000));
        assert_eq!(h.stable.balance_of(ALICE), units(3_000));
        assert_eq!(h.stable.total_supply(), units(3_000));
    }

    #[test]
    fn burn_more_than_debt() {
        let mut h = with_collateral(10);
        h.engine.mint_stable(ALICE, units(100)).unwrap();

        let err = h.engine.burn_stable(ALICE, units(101)).unwrap_err();
        assert!(matches!(err, EngineError::BurnExceedsDebt { .. }));
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn failed_burn_returns_pulled_stable() {
        let mut h = with_collateral(10);
        h.engine.mint_stable(ALICE, units(100)).unwrap();
        h.stable.set_fail_burn(true);

        let err = h.engine.burn_stable(ALICE, units(50)).unwrap_err();

        assert_eq!(err, EngineError::BurnFailed { amount: units(50) });
        assert_eq!(h.engine.debt_of(ALICE), units(100));
        assert_eq!(h.stable.balance_of(ALICE), units(100));
        assert_eq!(h.stable.balance_of(ENGINE), Amount::ZERO);
    }

    #[test]
    fn burn_without_stable_balance_fails_transfer() {
        let mut h = with_collateral(10);
        h.engine.mint_stable(ALICE, units(100)).unwrap();
        h.stable.transfer_from(ALICE, BOB, units(100));

        let err = h.engine.burn_stable(ALICE, units(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(h.engine.debt_of(ALICE), units(100));
    }

    #[test]
    fn deposit_and_mint_together() {
        let mut h = Harness::new();
        h.fund(ALICE, 10);

        h.engine
            .deposit_collateral_and_mint(ALICE, WETH, units(10), units(5_000))
            .unwrap();

        let info = h.engine.get_account_information(ALICE).unwrap();
        assert_eq!(info.debt_minted, units(5_000));
        assert_eq!(info.collateral_value.as_stable(), units(20_000));
    }

    #[test]
    fn deposit_and_mint_returns_collateral_when_mint_fails() {
        let mut h = Harness::new();
        h.fund(ALICE, 10);
        h.stable.set_fail_mint(true);

        let err = h
            .engine
            .deposit_collateral_and_mint(ALICE, WETH, units(10), units(5_000))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MintFailed);
        assert!(h.engine.position(ALICE).is_empty());
        assert_eq!(h.weth.balance_of(ALICE), units(10));
        assert_eq!(h.weth.balance_of(ENGINE), Amount::ZERO);
    }

    #[test]
    fn deposit_and_mint_checks_combined_health() {
        let mut h = Harness::new();
        h.fund(ALICE, 10);

        let err = h
            .engine
            .deposit_collateral_and_mint(ALICE, WETH, units(10), units(10_001))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::HealthFactorBroken);
        assert_eq!(h.weth.balance_of(ALICE), units(10));
    }

    #[test]
    fn redeem_for_stable_closes_position() {
        let mut h = with_collateral(10);
        h.engine.mint_stable(ALICE, units(10_000)).unwrap();

        h.engine
            .redeem_collateral_for_stable(ALICE, WETH, units(10), units(10_000))
            .unwrap();

        assert!(h.engine.position(ALICE).is_empty());
        assert_eq!(h.weth.balance_of(ALICE), units(10));
        assert_eq!(h.stable.total_supply(), Amount::ZERO);
    }

    #[test]
    fn redeem_for_stable_unwinds_burn_when_payout_fails() {
        let mut h = with_collateral(10);
        h.engine.mint_stable(ALICE, units(1_000)).unwrap();
        h.weth.set_fail_transfers(true);

        let err = h
            .engine
            .redeem_collateral_for_stable(ALICE, WETH, units(1), units(1_000))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(h.engine.debt_of(ALICE), units(1_000));
        // burned stable was re-minted and handed back
        assert_eq!(h.stable.balance_of(ALICE), units(1_000));
        assert_eq!(h.stable.total_supply(), units(1_000));
    }
}
