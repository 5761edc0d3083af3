//! External token movements for one operation.
//!
//! Each collaborator call is checked explicitly; a `false` becomes a typed error.
//! Reversible steps push a compensating call so that, if a later step fails,
//! tokens already pulled into custody go back where they came from. Paying
//! collateral out and minting to a user cannot be reversed by the engine, so
//! they are always the final step of an operation.

use super::results::{EngineError, TokenKind};
use crate::registry::CollateralAsset;
use crate::token::{CollateralToken, StableToken};
use crate::types::{AccountId, Amount, AssetId};
use std::rc::Rc;
use tracing::{error, warn};

enum Compensation {
    ReturnCollateral {
        token: Rc<dyn CollateralToken>,
        asset: AssetId,
        to: AccountId,
        amount: Amount,
    },
    ReturnStable {
        to: AccountId,
        amount: Amount,
    },
    // re-mint into custody what a burn destroyed
    Remint {
        amount: Amount,
    },
}

pub(super) struct Settlement<'a> {
    custody: AccountId,
    stable: &'a dyn StableToken,
    undo: Vec<Compensation>,
    finalized: bool,
}

impl<'a> Settlement<'a> {
    pub(super) fn new(custody: AccountId, stable: &'a dyn StableToken) -> Self {
        Self {
            custody,
            stable,
            undo: Vec::new(),
            finalized: false,
        }
    }

    /// Run `steps`; on failure undo every completed reversible step, newest first.
    pub(super) fn run(
        mut self,
        steps: impl FnOnce(&mut Self) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        match steps(&mut self) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.unwind();
                Err(err)
            }
        }
    }

    pub(super) fn pull_collateral(
        &mut self,
        collateral: &CollateralAsset,
        from: AccountId,
        amount: Amount,
    ) -> Result<(), EngineError> {
        self.check_open();
        if !collateral.token().transfer_from(from, self.custody, amount) {
            return Err(self.transfer_failed(TokenKind::Collateral(collateral.id()), from, self.custody, amount));
        }
        self.undo.push(Compensation::ReturnCollateral {
            token: Rc::clone(collateral.token()),
            asset: collateral.id(),
            to: from,
            amount,
        });
        Ok(())
    }

    /// Final step.
    pub(super) fn pay_collateral(
        &mut self,
        collateral: &CollateralAsset,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), EngineError> {
        self.check_open();
        if !collateral.token().transfer(to, amount) {
            return Err(self.transfer_failed(TokenKind::Collateral(collateral.id()), self.custody, to, amount));
        }
        self.finalized = true;
        Ok(())
    }

    pub(super) fn pull_stable(&mut self, from: AccountId, amount: Amount) -> Result<(), EngineError> {
        self.check_open();
        if !self.stable.transfer_from(from, self.custody, amount) {
            return Err(self.transfer_failed(TokenKind::Stable, from, self.custody, amount));
        }
        self.undo.push(Compensation::ReturnStable { to: from, amount });
        Ok(())
    }

    /// Burns from custody, so the amount must have been pulled first.
    pub(super) fn burn_stable(&mut self, amount: Amount) -> Result<(), EngineError> {
        self.check_open();
        if !self.stable.burn(amount) {
            warn!(%amount, "stable burn failed");
            return Err(EngineError::BurnFailed { amount });
        }
        self.undo.push(Compensation::Remint { amount });
        Ok(())
    }

    /// Final step.
    pub(super) fn mint_stable(&mut self, to: AccountId, amount: Amount) -> Result<(), EngineError> {
        self.check_open();
        if !self.stable.mint(to, amount) {
            warn!(%to, %amount, "stable mint failed");
            return Err(EngineError::MintFailed { to, amount });
        }
        self.finalized = true;
        Ok(())
    }

    fn check_open(&self) {
        debug_assert!(!self.finalized, "no settlement step may follow an irreversible one");
    }

    fn transfer_failed(&self, token: TokenKind, from: AccountId, to: AccountId, amount: Amount) -> EngineError {
        warn!(%token, %from, %to, %amount, "token transfer failed");
        EngineError::TransferFailed {
            token,
            from,
            to,
            amount,
        }
    }

    fn unwind(self) {
        for step in self.undo.into_iter().rev() {
            match step {
                Compensation::ReturnCollateral {
                    token,
                    asset,
                    to,
                    amount,
                } => {
                    if !token.transfer(to, amount) {
                        error!(%asset, %to, %amount, "failed to return pulled collateral");
                    }
                }
                Compensation::ReturnStable { to, amount } => {
                    if !self.stable.transfer(to, amount) {
                        error!(%to, %amount, "failed to return pulled stable");
                    }
                }
                Compensation::Remint { amount } => {
                    if !self.stable.mint(self.custody, amount) {
                        error!(%amount, "failed to re-mint burned stable");
                    }
                }
            }
        }
    }
}
