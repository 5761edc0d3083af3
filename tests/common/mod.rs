//! Fixture shared by the integration tests: weth (18 decimals) and wbtc
//! (8 decimals) on mock tokens and 8 decimal feeds, with an 18 decimal stable.

#![allow(dead_code)]

use stable_engine::*;
use std::rc::Rc;

pub const ENGINE: AccountId = AccountId(0);
pub const KEEPER: AccountId = AccountId(999);

pub const WETH: AssetId = AssetId(1);
pub const WBTC: AssetId = AssetId(2);

pub const PRICE_UNIT: i128 = 100_000_000;
pub const WAD: u128 = 1_000_000_000_000_000_000;

pub fn units(n: u128) -> Amount {
    Amount::new(n * WAD)
}

pub fn btc(n: u128) -> Amount {
    Amount::new(n * 100_000_000)
}

pub struct World {
    pub engine: Engine,
    pub weth: Rc<MockCollateralToken>,
    pub wbtc: Rc<MockCollateralToken>,
    pub weth_feed: Rc<MockPriceFeed>,
    pub wbtc_feed: Rc<MockPriceFeed>,
    pub stable: Rc<MockStableToken>,
}

pub fn world() -> World {
    world_with(EngineConfig::default())
}

pub fn world_with(config: EngineConfig) -> World {
    let weth = Rc::new(MockCollateralToken::new(WETH, 18, ENGINE));
    let wbtc = Rc::new(MockCollateralToken::new(WBTC, 8, ENGINE));
    let weth_feed = Rc::new(MockPriceFeed::new(FeedId(1), 2_000 * PRICE_UNIT, 8));
    let wbtc_feed = Rc::new(MockPriceFeed::new(FeedId(2), 30_000 * PRICE_UNIT, 8));
    let stable = Rc::new(MockStableToken::new(18, ENGINE));

    let engine = Engine::new(
        config,
        vec![
            weth.clone() as Rc<dyn CollateralToken>,
            wbtc.clone() as Rc<dyn CollateralToken>,
        ],
        vec![
            weth_feed.clone() as Rc<dyn PriceFeed>,
            wbtc_feed.clone() as Rc<dyn PriceFeed>,
        ],
        stable.clone() as Rc<dyn StableToken>,
    )
    .unwrap();

    World {
        engine,
        weth,
        wbtc,
        weth_feed,
        wbtc_feed,
        stable,
    }
}

impl World {
    pub fn open(&mut self, account: AccountId, weth_units: u128, debt_units: u128) {
        self.weth.mint_to(account, units(weth_units));
        self.engine.deposit_collateral(account, WETH, units(weth_units)).unwrap();
        if debt_units > 0 {
            self.engine.mint_stable(account, units(debt_units)).unwrap();
        }
    }

    pub fn set_weth_price(&self, usd: i128) {
        self.weth_feed.set_price(usd * PRICE_UNIT);
    }

    /// Ledger collateral summed over all accounts.
    pub fn ledger_collateral(&self, asset: AssetId) -> Amount {
        self.engine
            .ledger()
            .accounts()
            .fold(Amount::ZERO, |acc, (_, p)| acc.checked_add(p.collateral_of(asset)).unwrap())
    }
}
