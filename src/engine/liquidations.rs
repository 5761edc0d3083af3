//! Liquidation of under-collateralized positions.

use super::core::{rejected, Engine};
use super::results::{EngineError, LiquidationResult};
use crate::events::{EventPayload, LiquidationEvent};
use crate::ledger::Changeset;
use crate::types::{AccountId, Amount, AssetId, UsdValue};
use tracing::info;

impl Engine {
    /// Cover `debt_to_cover` of `account`'s debt with the liquidator's stable and
    /// take the equivalent collateral of `asset`, plus the liquidation bonus.
    ///
    /// Only allowed while `account` is below the minimum health factor. Succeeds
    /// only if its health factor strictly improves and ends at or above the
    /// minimum, or the debt is fully repaid. The seized amount is
    /// floored, so the liquidator never receives more than the debt buys.
    pub fn liquidate(
        &mut self,
        liquidator: AccountId,
        account: AccountId,
        asset: AssetId,
        debt_to_cover: Amount,
    ) -> Result<LiquidationResult, EngineError> {
        let (changeset, result) = self
            .stage_liquidation(liquidator, account, asset, debt_to_cover)
            .map_err(|e| rejected("liquidate", account, e))?;
        self.commit(changeset);

        info!(
            %liquidator,
            %account,
            %asset,
            debt_covered = %result.debt_covered,
            collateral_seized = %result.collateral_seized,
            health_before = %result.health_before,
            health_after = %result.health_after,
            "position liquidated"
        );
        Ok(result)
    }

    fn stage_liquidation(
        &self,
        liquidator: AccountId,
        account: AccountId,
        asset: AssetId,
        debt_to_cover: Amount,
    ) -> Result<(Changeset, LiquidationResult), EngineError> {
        if debt_to_cover.is_zero() {
            return Err(EngineError::ZeroAmount);
        }
        let collateral = self.registry.require(asset)?;

        let mut prices = self.prices();
        let mut tx = self.ledger.begin(&self.registry);

        let health_before = self.health_factor_of(tx.position(account), &mut prices)?;
        if health_before >= self.params.min_health_factor {
            return Err(EngineError::HealthFactorOk {
                account,
                health_factor: health_before,
            });
        }

        let debt_covered = UsdValue::from_stable(debt_to_cover);
        let seized = prices.token_amount_from_usd(asset, debt_covered)?;
        let bonus = seized.bps_of(self.params.liquidation_bonus)?;
        let total_seized = seized.checked_add(bonus)?;

        tx.record_redeem(account, liquidator, asset, total_seized)?;
        tx.record_burn(account, debt_to_cover)?;

        // must improve, and must end at the minimum unless the debt is gone
        let health_after = self.health_factor_of(tx.position(account), &mut prices)?;
        let closed = tx.debt_of(account).is_zero();
        if health_after <= health_before || (!closed && health_after < self.params.min_health_factor) {
            return Err(EngineError::HealthFactorNotImproved {
                account,
                before: health_before,
                after: health_after,
            });
        }
        self.ensure_healthy(liquidator, tx.position(liquidator), &mut prices)?;

        tx.push_event(EventPayload::Liquidation(LiquidationEvent {
            liquidator,
            account,
            asset,
            debt_covered,
            collateral_seized: total_seized,
            bonus,
            health_before,
            health_after,
        }));

        self.settlement().run(|s| {
            s.pull_stable(liquidator, debt_to_cover)?;
            s.burn_stable(debt_to_cover)?;
            s.pay_collateral(collateral, liquidator, total_seized)
        })?;

        let result = LiquidationResult {
            liquidator,
            account,
            asset,
            debt_covered: debt_to_cover,
            collateral_seized: total_seized,
            bonus,
            health_before,
            health_after,
        };
        Ok((tx.finish(), result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;
    use crate::engine::ErrorKind;
    use crate::types::HealthFactor;
    use crate::token::StableToken;
    use rust_decimal_macros::dec;

    // alice: 10 weth at 2000 with 10k debt, exactly at the minimum.
    // bob holds 20k stable to liquidate with.
    fn underwater_at(price: i128) -> Harness {
        let mut h = Harness::new();
        h.fund(ALICE, 10);
        h.engine
            .deposit_collateral_and_mint(ALICE, WETH, units(10), units(10_000))
            .unwrap();
        h.give_stable(BOB, units(20_000));
        h.weth_feed.set_price(price * PRICE_UNIT);
        h
    }

    #[test]
    fn healthy_account_cannot_be_liquidated() {
        let mut h = underwater_at(2_000);

        let err = h.engine.liquidate(BOB, ALICE, WETH, units(100)).unwrap_err();

        assert_eq!(
            err,
            EngineError::HealthFactorOk {
                account: ALICE,
                health_factor: HealthFactor::ONE,
            }
        );
    }

    #[test]
    fn debt_free_account_cannot_be_liquidated() {
        let mut h = Harness::new();
        h.fund(ALICE, 1);
        h.engine.deposit_collateral(ALICE, WETH, units(1)).unwrap();

        let err = h.engine.liquidate(BOB, ALICE, WETH, units(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HealthFactorOk);
    }

    #[test]
    fn partial_liquidation_restores_health() {
        let mut h = underwater_at(1_800);
        assert_eq!(h.engine.get_health_factor(ALICE).unwrap().to_decimal(), Some(dec!(0.9)));

        let result = h.engine.liquidate(BOB, ALICE, WETH, units(5_000)).unwrap();

        // 5000 / 1800 weth, floored, plus 10%
        let seized = 2_777_777_777_777_777_777u128;
        assert_eq!(result.bonus, Amount::new(seized / 10));
        assert_eq!(result.collateral_seized, Amount::new(seized + seized / 10));
        // 6.944 weth left at 1800 backs 5000 debt at 1.25
        assert_eq!(result.health_after.to_decimal(), Some(dec!(1.25)));
        assert!(result.health_after >= h.engine.min_health_factor());
        assert!(!h.engine.is_liquidatable(ALICE).unwrap());

        assert_eq!(h.engine.debt_of(ALICE), units(5_000));
        assert_eq!(h.weth.balance_of(BOB), result.collateral_seized);
        assert_eq!(h.stable.balance_of(BOB), units(15_000));
        assert_eq!(h.stable.total_supply(), units(25_000));
        assert_eq!(h.engine.get_health_factor(ALICE).unwrap(), result.health_after);
    }

    #[test]
    fn liquidation_short_of_minimum_rejected() {
        let mut h = underwater_at(1_800);
        let before = h.engine.position(ALICE).clone();
        let events = h.engine.events().len();

        // 100 improves alice from 0.9 to about 0.9035, not enough
        let err = h.engine.liquidate(BOB, ALICE, WETH, units(100)).unwrap_err();

        match err {
            EngineError::HealthFactorNotImproved { account, before: hf_before, after } => {
                assert_eq!(account, ALICE);
                assert_eq!(hf_before.to_decimal(), Some(dec!(0.9)));
                assert!(after > hf_before);
                assert!(after < HealthFactor::ONE);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(h.engine.position(ALICE), &before);
        assert_eq!(h.engine.events().len(), events);
        assert_eq!(h.stable.balance_of(BOB), units(20_000));
        assert_eq!(h.weth.balance_of(BOB), Amount::ZERO);
        assert!(h.engine.is_liquidatable(ALICE).unwrap());
    }

    #[test]
    fn full_repayment_closes_position() {
        let mut h = underwater_at(1_200);

        let result = h.engine.liquidate(BOB, ALICE, WETH, units(10_000)).unwrap();

        assert!(result.health_after.is_max());
        assert_eq!(h.engine.debt_of(ALICE), Amount::ZERO);
        // 10000 / 1200 weth plus 10%, the rest stays with alice
        let seized = 8_333_333_333_333_333_333u128;
        assert_eq!(result.collateral_seized, Amount::new(seized + seized / 10));
        assert_eq!(
            h.engine.collateral_balance(ALICE, WETH),
            Amount::new(units(10).raw() - seized - seized / 10)
        );
    }

    #[test]
    fn liquidation_emits_event_after_ledger_events() {
        let mut h = underwater_at(1_800);

        h.engine.liquidate(BOB, ALICE, WETH, units(5_000)).unwrap();

        let events = h.engine.recent_events(3);
        assert!(matches!(events[0].payload, EventPayload::CollateralRedeemed(ref e) if e.to == BOB));
        assert!(matches!(events[1].payload, EventPayload::DebtBurned(_)));
        assert!(matches!(events[2].payload, EventPayload::Liquidation(ref e) if e.liquidator == BOB));
    }

    #[test]
    fn liquidation_that_worsens_health_rejected() {
        // at 1000 the position is 100% collateralized, the bonus makes things worse
        let mut h = underwater_at(1_000);
        let before = h.engine.position(ALICE).clone();

        let err = h.engine.liquidate(BOB, ALICE, WETH, units(1_000)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::HealthFactorNotImproved);
        assert_eq!(h.engine.position(ALICE), &before);
        assert_eq!(h.stable.balance_of(BOB), units(20_000));
        assert_eq!(h.weth.balance_of(BOB), Amount::ZERO);
    }

    #[test]
    fn seizing_more_than_deposited_is_a_value_error() {
        let mut h = underwater_at(1_000);

        let err = h.engine.liquidate(BOB, ALICE, WETH, units(10_000)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientCollateral { .. }));
    }

    #[test]
    fn liquidation_without_stable_rolls_back() {
        let mut h = underwater_at(1_800);
        let before = h.engine.position(ALICE).clone();

        let err = h.engine.liquidate(LIQUIDATOR, ALICE, WETH, units(5_000)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(h.engine.position(ALICE), &before);
    }

    #[test]
    fn failed_payout_unwinds_the_burn() {
        let mut h = underwater_at(1_800);
        h.weth.set_fail_transfers(true);

        let err = h.engine.liquidate(BOB, ALICE, WETH, units(5_000)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(h.engine.debt_of(ALICE), units(10_000));
        assert_eq!(h.stable.balance_of(BOB), units(20_000));
        assert_eq!(h.stable.total_supply(), units(30_000));
    }

    #[test]
    fn unhealthy_liquidator_rejected() {
        let mut h = underwater_at(2_000);
        // bob opens the same position as alice, so the drop sinks both
        h.fund(BOB, 10);
        h.engine
            .deposit_collateral_and_mint(BOB, WETH, units(10), units(10_000))
            .unwrap();
        h.weth_feed.set_price(1_800 * PRICE_UNIT);

        let err = h.engine.liquidate(BOB, ALICE, WETH, units(5_000)).unwrap_err();

        assert_eq!(
            err,
            EngineError::HealthFactorBroken {
                account: BOB,
                health_factor: HealthFactor::from_decimal(dec!(0.9)).unwrap(),
                minimum: HealthFactor::ONE,
            }
        );
    }

    #[test]
    fn zero_debt_to_cover_rejected() {
        let mut h = underwater_at(1_800);
        let err = h.engine.liquidate(BOB, ALICE, WETH, Amount::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn feed_is_read_once_per_liquidation() {
        let mut h = underwater_at(1_800);
        let reads = h.weth_feed.reads();

        h.engine.liquidate(BOB, ALICE, WETH, units(5_000)).unwrap();

        assert_eq!(h.weth_feed.reads(), reads + 1);
    }
}
