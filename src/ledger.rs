//! Position ledger: per-account collateral balances and minted debt.
//!
//! The ledger is the only mutable state the engine owns. Nothing writes to it
//! directly: an operation opens a [`LedgerTx`], stages its mutations there
//! (copy-on-write of the positions it touches, plus the events they produce),
//! and either drops the transaction or turns it into a [`Changeset`] that
//! [`PositionLedger::apply`] commits in one step.

use crate::events::{
    CollateralDepositedEvent, CollateralRedeemedEvent, DebtBurnedEvent, EventPayload,
    StableMintedEvent,
};
use crate::math::MathError;
use crate::registry::CollateralRegistry;
use crate::types::{AccountId, Amount, AssetId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

static EMPTY_POSITION: AccountPosition = AccountPosition {
    collateral: BTreeMap::new(),
    debt_minted: Amount::ZERO,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosition {
    pub collateral: BTreeMap<AssetId, Amount>,
    pub debt_minted: Amount,
}

impl AccountPosition {
    pub fn collateral_of(&self, asset: AssetId) -> Amount {
        self.collateral.get(&asset).copied().unwrap_or(Amount::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.debt_minted.is_zero() && self.collateral.values().all(Amount::is_zero)
    }

    fn add_collateral(&mut self, asset: AssetId, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.collateral.entry(asset).or_insert(Amount::ZERO);
        *balance = balance.checked_add(amount)?;
        Ok(())
    }

    fn remove_collateral(&mut self, asset: AssetId, amount: Amount) -> Result<(), LedgerError> {
        let available = self.collateral_of(asset);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCollateral {
                asset,
                requested: amount,
                available,
            })?;
        if remaining.is_zero() {
            self.collateral.remove(&asset);
        } else {
            self.collateral.insert(asset, remaining);
        }
        Ok(())
    }

    fn add_debt(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.debt_minted = self.debt_minted.checked_add(amount)?;
        Ok(())
    }

    fn remove_debt(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.debt_minted = self
            .debt_minted
            .checked_sub(amount)
            .ok_or(LedgerError::BurnExceedsDebt {
                requested: amount,
                outstanding: self.debt_minted,
            })?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("collateral asset {0} is not allowed")]
    UnknownAsset(AssetId),

    #[error("insufficient {asset} collateral: requested {requested}, available {available}")]
    InsufficientCollateral {
        asset: AssetId,
        requested: Amount,
        available: Amount,
    },

    #[error("burn of {requested} exceeds outstanding debt {outstanding}")]
    BurnExceedsDebt { requested: Amount, outstanding: Amount },

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Staged mutations ready to be committed.
#[derive(Debug, Default)]
pub struct Changeset {
    positions: Vec<(AccountId, AccountPosition)>,
    events: Vec<EventPayload>,
}

#[derive(Debug, Default)]
pub struct PositionLedger {
    positions: HashMap<AccountId, AccountPosition>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed position. accounts with no activity read as all zero.
    pub fn position(&self, account: AccountId) -> &AccountPosition {
        self.positions.get(&account).unwrap_or(&EMPTY_POSITION)
    }

    pub fn collateral_balance(&self, account: AccountId, asset: AssetId) -> Amount {
        self.position(account).collateral_of(asset)
    }

    pub fn debt_of(&self, account: AccountId) -> Amount {
        self.position(account).debt_minted
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &AccountPosition)> {
        self.positions.iter()
    }

    pub fn total_debt(&self) -> Result<Amount, MathError> {
        self.positions
            .values()
            .try_fold(Amount::ZERO, |acc, p| acc.checked_add(p.debt_minted))
    }

    pub fn begin<'a>(&'a self, registry: &'a CollateralRegistry) -> LedgerTx<'a> {
        LedgerTx {
            ledger: self,
            registry,
            staged: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Commit a changeset. returns the events it carried, in the order they were staged.
    pub fn apply(&mut self, changeset: Changeset) -> Vec<EventPayload> {
        for (account, position) in changeset.positions {
            if position.is_empty() {
                self.positions.remove(&account);
            } else {
                self.positions.insert(account, position);
            }
        }
        changeset.events
    }
}

/// A read-your-writes view over the ledger. dropping it discards everything staged.
pub struct LedgerTx<'a> {
    ledger: &'a PositionLedger,
    registry: &'a CollateralRegistry,
    staged: HashMap<AccountId, AccountPosition>,
    events: Vec<EventPayload>,
}

impl<'a> LedgerTx<'a> {
    pub fn position(&self, account: AccountId) -> &AccountPosition {
        self.staged
            .get(&account)
            .unwrap_or_else(|| self.ledger.position(account))
    }

    pub fn debt_of(&self, account: AccountId) -> Amount {
        self.position(account).debt_minted
    }

    pub fn collateral_balance(&self, account: AccountId, asset: AssetId) -> Amount {
        self.position(account).collateral_of(asset)
    }

    pub fn record_deposit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.check_asset(asset, amount)?;
        self.stage(account).add_collateral(asset, amount)?;
        self.events
            .push(EventPayload::CollateralDeposited(CollateralDepositedEvent {
                account,
                asset,
                amount,
            }));
        Ok(())
    }

    /// Debits `from`'s collateral. `to` is only recorded on the event; the tokens
    /// themselves move outside the ledger.
    pub fn record_redeem(
        &mut self,
        from: AccountId,
        to: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.check_asset(asset, amount)?;
        self.stage(from).remove_collateral(asset, amount)?;
        self.events
            .push(EventPayload::CollateralRedeemed(CollateralRedeemedEvent {
                from,
                to,
                asset,
                amount,
            }));
        Ok(())
    }

    pub fn record_mint(&mut self, account: AccountId, amount: Amount) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        self.stage(account).add_debt(amount)?;
        self.events
            .push(EventPayload::StableMinted(StableMintedEvent { account, amount }));
        Ok(())
    }

    pub fn record_burn(&mut self, account: AccountId, amount: Amount) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        self.stage(account).remove_debt(amount)?;
        self.events
            .push(EventPayload::DebtBurned(DebtBurnedEvent { account, amount }));
        Ok(())
    }

    pub fn push_event(&mut self, payload: EventPayload) {
        self.events.push(payload);
    }

    pub fn finish(self) -> Changeset {
        Changeset {
            positions: self.staged.into_iter().collect(),
            events: self.events,
        }
    }

    fn check_asset(&self, asset: AssetId, amount: Amount) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if !self.registry.is_allowed(asset) {
            return Err(LedgerError::UnknownAsset(asset));
        }
        Ok(())
    }

    fn stage(&mut self, account: AccountId) -> &mut AccountPosition {
        let ledger = self.ledger;
        self.staged
            .entry(account)
            .or_insert_with(|| ledger.position(account).clone())
    }
}
