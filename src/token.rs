// 4.0 token.rs: the token collaborators the engine moves value through.
//
// Neither the collateral tokens nor the stable asset are owned by the engine. they signal
// failure by returning false, never by panicking, and the engine must check every call.
// `transfer` and `burn` act on the caller's own balance, which for the engine is its
// custody account.
//
// The mocks are in-memory balance books with switchable failure so the engine can be
// exercised without a live ledger.

use crate::types::{AccountId, Amount, AssetId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A collateral token the engine custodies.
pub trait CollateralToken {
    fn asset_id(&self) -> AssetId;

    fn decimals(&self) -> u8;

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: Amount) -> bool;

    /// Moves `amount` out of the caller's balance.
    fn transfer(&self, to: AccountId, amount: Amount) -> bool;
}

/// The stable asset minted against collateral.
pub trait StableToken {
    fn decimals(&self) -> u8;

    fn mint(&self, to: AccountId, amount: Amount) -> bool;

    /// Burns from the caller's own balance.
    fn burn(&self, amount: Amount) -> bool;

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: Amount) -> bool;

    fn transfer(&self, to: AccountId, amount: Amount) -> bool;

    fn balance_of(&self, account: AccountId) -> Amount;
}

// plain balance book shared by both mocks
#[derive(Debug, Default)]
struct BalanceBook {
    balances: RefCell<HashMap<AccountId, u128>>,
}

impl BalanceBook {
    fn balance_of(&self, account: AccountId) -> u128 {
        self.balances.borrow().get(&account).copied().unwrap_or(0)
    }

    fn credit(&self, account: AccountId, amount: u128) -> bool {
        let mut balances = self.balances.borrow_mut();
        let entry = balances.entry(account).or_insert(0);
        match entry.checked_add(amount) {
            Some(next) => {
                *entry = next;
                true
            }
            None => false,
        }
    }

    fn debit(&self, account: AccountId, amount: u128) -> bool {
        let mut balances = self.balances.borrow_mut();
        match balances.get_mut(&account) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                true
            }
            _ => amount == 0,
        }
    }

    fn move_funds(&self, from: AccountId, to: AccountId, amount: u128) -> bool {
        if self.balance_of(from) < amount {
            return false;
        }
        self.debit(from, amount) && self.credit(to, amount)
    }
}

/// Mock collateral token. `custodian` is the account whose balance `transfer` spends.
#[derive(Debug)]
pub struct MockCollateralToken {
    asset_id: AssetId,
    decimals: u8,
    custodian: AccountId,
    book: BalanceBook,
    fail_transfers: Cell<bool>,
}

impl MockCollateralToken {
    pub fn new(asset_id: AssetId, decimals: u8, custodian: AccountId) -> Self {
        Self {
            asset_id,
            decimals,
            custodian,
            book: BalanceBook::default(),
            fail_transfers: Cell::new(false),
        }
    }

    // test faucet
    pub fn mint_to(&self, account: AccountId, amount: Amount) {
        self.book.credit(account, amount.raw());
    }

    pub fn balance_of(&self, account: AccountId) -> Amount {
        Amount::new(self.book.balance_of(account))
    }

    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }
}

impl CollateralToken for MockCollateralToken {
    fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: Amount) -> bool {
        !self.fail_transfers.get() && self.book.move_funds(from, to, amount.raw())
    }

    fn transfer(&self, to: AccountId, amount: Amount) -> bool {
        !self.fail_transfers.get() && self.book.move_funds(self.custodian, to, amount.raw())
    }
}

/// Mock stable asset with independently switchable mint, burn and transfer failure.
#[derive(Debug)]
pub struct MockStableToken {
    decimals: u8,
    custodian: AccountId,
    book: BalanceBook,
    total_supply: Cell<u128>,
    fail_mint: Cell<bool>,
    fail_burn: Cell<bool>,
    fail_transfers: Cell<bool>,
}

impl MockStableToken {
    pub fn new(decimals: u8, custodian: AccountId) -> Self {
        Self {
            decimals,
            custodian,
            book: BalanceBook::default(),
            total_supply: Cell::new(0),
            fail_mint: Cell::new(false),
            fail_burn: Cell::new(false),
            fail_transfers: Cell::new(false),
        }
    }

    pub fn total_supply(&self) -> Amount {
        Amount::new(self.total_supply.get())
    }

    pub fn set_fail_mint(&self, fail: bool) {
        self.fail_mint.set(fail);
    }

    pub fn set_fail_burn(&self, fail: bool) {
        self.fail_burn.set(fail);
    }

    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }
}

impl StableToken for MockStableToken {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn mint(&self, to: AccountId, amount: Amount) -> bool {
        if self.fail_mint.get() {
            return false;
        }
        let Some(supply) = self.total_supply.get().checked_add(amount.raw()) else {
            return false;
        };
        if !self.book.credit(to, amount.raw()) {
            return false;
        }
        self.total_supply.set(supply);
        true
    }

    fn burn(&self, amount: Amount) -> bool {
        if self.fail_burn.get() || !self.book.debit(self.custodian, amount.raw()) {
            return false;
        }
        self.total_supply.set(self.total_supply.get() - amount.raw());
        true
    }

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: Amount) -> bool {
        !self.fail_transfers.get() && self.book.move_funds(from, to, amount.raw())
    }

    fn transfer(&self, to: AccountId, amount: Amount) -> bool {
        !self.fail_transfers.get() && self.book.move_funds(self.custodian, to, amount.raw())
    }

    fn balance_of(&self, account: AccountId) -> Amount {
        Amount::new(self.book.balance_of(account))
    }
}
