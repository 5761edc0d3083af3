//! Shared fixture for the engine's unit tests: two collateral assets on mock
//! tokens and feeds, and a mock stable asset.

use super::{Engine, EngineConfig};
use crate::price_feed::{MockPriceFeed, PriceFeed};
use crate::token::{CollateralToken, MockCollateralToken, MockStableToken, StableToken};
use crate::types::{AccountId, Amount, AssetId, FeedId};
use std::rc::Rc;

pub(crate) const ENGINE: AccountId = AccountId(0);
pub(crate) const ALICE: AccountId = AccountId(1);
pub(crate) const BOB: AccountId = AccountId(2);
pub(crate) const LIQUIDATOR: AccountId = AccountId(3);

pub(crate) const WETH: AssetId = AssetId(1);
pub(crate) const WBTC: AssetId = AssetId(2);
pub(crate) const WETH_FEED: FeedId = FeedId(1);
pub(crate) const WBTC_FEED: FeedId = FeedId(2);

// feeds answer with 8 decimals
pub(crate) const PRICE_UNIT: i128 = 100_000_000;

const WAD: u128 = 1_000_000_000_000_000_000;

/// Whole units of an 18 decimal token (weth or stable).
pub(crate) fn units(n: u128) -> Amount {
    Amount::new(n * WAD)
}

pub(crate) fn btc(n: u128) -> Amount {
    Amount::new(n * 100_000_000)
}

pub(crate) struct Harness {
    pub engine: Engine,
    pub weth: Rc<MockCollateralToken>,
    pub wbtc: Rc<MockCollateralToken>,
    pub weth_feed: Rc<MockPriceFeed>,
    pub wbtc_feed: Rc<MockPriceFeed>,
    pub stable: Rc<MockStableToken>,
}

impl Harness {
    /// weth at 2000, wbtc (8 decimals) at 30000, default risk params.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let weth = Rc::new(MockCollateralToken::new(WETH, 18, ENGINE));
        let wbtc = Rc::new(MockCollateralToken::new(WBTC, 8, ENGINE));
        let weth_feed = Rc::new(MockPriceFeed::new(WETH_FEED, 2_000 * PRICE_UNIT, 8));
        let wbtc_feed = Rc::new(MockPriceFeed::new(WBTC_FEED, 30_000 * PRICE_UNIT, 8));
        let stable = Rc::new(MockStableToken::new(18, ENGINE));

        let tokens = vec![
            weth.clone() as Rc<dyn CollateralToken>,
            wbtc.clone() as Rc<dyn CollateralToken>,
        ];
        let feeds = vec![
            weth_feed.clone() as Rc<dyn PriceFeed>,
            wbtc_feed.clone() as Rc<dyn PriceFeed>,
        ];
        let stable_token: Rc<dyn StableToken> = stable.clone();

        let engine = Engine::new(config, tokens, feeds, stable_token).unwrap();

        Self {
            engine,
            weth,
            wbtc,
            weth_feed,
            wbtc_feed,
            stable,
        }
    }

    pub fn fund(&self, account: AccountId, weth_units: u128) {
        self.weth.mint_to(account, units(weth_units));
    }

    pub fn fund_btc(&self, account: AccountId, whole_btc: u128) {
        self.wbtc.mint_to(account, btc(whole_btc));
    }

    // stable from outside the engine, e.g. bought on a market
    pub fn give_stable(&self, account: AccountId, amount: Amount) {
        assert!(self.stable.mint(account, amount));
    }
}
