// Price Feed Integration
//
// This module abstracts how the engine reads collateral prices. The core engine is
// agnostic to whether prices come from Chainlink, Pyth or a custom oracle: a feed reports
// a raw integer answer plus the number of decimals it carries. Staleness and liveness are
// the feed's responsibility, not ours.
//
// Conversions never cache across operations. Within one operation a PriceSnapshot reads
// each asset at most once so every computation in that operation sees the same price.

use crate::config::MAX_DECIMALS;
use crate::ledger::AccountPosition;
use crate::math::{self, MathError};
use crate::registry::CollateralRegistry;
use crate::types::{Amount, AssetId, FeedId, UsdValue};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashMap;

/// Latest answer from an oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPrice {
    /// Raw answer. Oracles report signed values; anything <= 0 is unusable.
    pub answer: i128,
    /// Decimal places carried by `answer`
    pub decimals: u8,
}

impl FeedPrice {
    pub fn new(answer: i128, decimals: u8) -> Self {
        Self { answer, decimals }
    }
}

/// Trait for price feed adapters. Implement this to integrate with specific
/// oracle networks or data sources.
pub trait PriceFeed {
    fn feed_id(&self) -> FeedId;

    /// Fetch the latest price. None when the feed has nothing usable.
    fn latest_price(&self) -> Option<FeedPrice>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("unknown collateral asset {0}")]
    UnknownAsset(AssetId),

    #[error("no price available for {0}")]
    Unavailable(AssetId),

    #[error("feed for {asset} returned unusable price {answer}")]
    InvalidPrice { asset: AssetId, answer: i128 },

    #[error("feed for {asset} reports unsupported precision of {decimals} decimals")]
    UnsupportedDecimals { asset: AssetId, decimals: u8 },

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Price of one whole token expressed in usd precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPrice {
    per_token: u128,
    token_decimals: u8,
}

impl UnitPrice {
    /// Upscale (or floor-downscale) the feed answer to `usd_decimals`.
    /// 2000 usd at 8 feed decimals with 18 usd decimals -> 2000e18.
    pub fn from_feed(
        asset: AssetId,
        price: FeedPrice,
        token_decimals: u8,
        usd_decimals: u8,
    ) -> Result<Self, PriceError> {
        if price.answer <= 0 {
            return Err(PriceError::InvalidPrice {
                asset,
                answer: price.answer,
            });
        }
        if price.decimals > MAX_DECIMALS {
            return Err(PriceError::UnsupportedDecimals {
                asset,
                decimals: price.decimals,
            });
        }

        let per_token = math::rescale(price.answer as u128, price.decimals, usd_decimals)?;
        // a price that floors to zero would make every amount worthless and the inverse undefined
        if per_token == 0 {
            return Err(PriceError::InvalidPrice {
                asset,
                answer: price.answer,
            });
        }

        Ok(Self {
            per_token,
            token_decimals,
        })
    }

    pub fn per_token(&self) -> u128 {
        self.per_token
    }

    /// amount * price / 10^token_decimals, floored
    pub fn usd_value(&self, amount: Amount) -> Result<UsdValue, MathError> {
        let unit = math::pow10(self.token_decimals)?;
        math::mul_div(amount.raw(), self.per_token, unit).map(UsdValue::new)
    }

    /// usd * 10^token_decimals / price, floored. never returns more than the usd buys.
    pub fn token_amount(&self, usd: UsdValue) -> Result<Amount, MathError> {
        let unit = math::pow10(self.token_decimals)?;
        math::mul_div(usd.raw(), unit, self.per_token).map(Amount::new)
    }
}

/// Per-operation price cache over the registry's feeds.
pub struct PriceSnapshot<'a> {
    registry: &'a CollateralRegistry,
    usd_decimals: u8,
    prices: HashMap<AssetId, UnitPrice>,
}

impl<'a> PriceSnapshot<'a> {
    pub fn new(registry: &'a CollateralRegistry, usd_decimals: u8) -> Self {
        Self {
            registry,
            usd_decimals,
            prices: HashMap::new(),
        }
    }

    pub fn unit_price(&mut self, asset: AssetId) -> Result<UnitPrice, PriceError> {
        if let Some(price) = self.prices.get(&asset) {
            return Ok(*price);
        }

        let collateral = self
            .registry
            .get(asset)
            .ok_or(PriceError::UnknownAsset(asset))?;
        let feed_price = collateral
            .feed()
            .latest_price()
            .ok_or(PriceError::Unavailable(asset))?;
        let price = UnitPrice::from_feed(asset, feed_price, collateral.decimals(), self.usd_decimals)?;

        self.prices.insert(asset, price);
        Ok(price)
    }

    pub fn usd_value(&mut self, asset: AssetId, amount: Amount) -> Result<UsdValue, PriceError> {
        Ok(self.unit_price(asset)?.usd_value(amount)?)
    }

    pub fn token_amount_from_usd(&mut self, asset: AssetId, usd: UsdValue) -> Result<Amount, PriceError> {
        Ok(self.unit_price(asset)?.token_amount(usd)?)
    }

    /// Sum of every allowed asset's value in the position. assets with a zero balance
    /// are skipped without touching their feed.
    pub fn total_collateral_usd(&mut self, position: &AccountPosition) -> Result<UsdValue, PriceError> {
        let registry = self.registry;
        let mut total = UsdValue::ZERO;
        for asset in registry.asset_ids() {
            let amount = position.collateral_of(asset);
            if amount.is_zero() {
                continue;
            }
            total = total.checked_add(self.usd_value(asset, amount)?)?;
        }
        Ok(total)
    }
}

/// Mock adapter for testing
#[derive(Debug)]
pub struct MockPriceFeed {
    feed_id: FeedId,
    answer: Cell<i128>,
    decimals: u8,
    healthy: Cell<bool>,
    reads: Cell<u64>,
}

impl MockPriceFeed {
    pub fn new(feed_id: FeedId, answer: i128, decimals: u8) -> Self {
        Self {
            feed_id,
            answer: Cell::new(answer),
            decimals,
            healthy: Cell::new(true),
            reads: Cell::new(0),
        }
    }

    pub fn set_price(&self, answer: i128) {
        self.answer.set(answer);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.set(healthy);
    }

    // how many times latest_price was called
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

impl PriceFeed for MockPriceFeed {
    fn feed_id(&self) -> FeedId {
        self.feed_id
    }

    fn latest_price(&self) -> Option<FeedPrice> {
        self.reads.set(self.reads.get() + 1);
        if self.healthy.get() {
            Some(FeedPrice::new(self.answer.get(), self.decimals))
        } else {
            None
        }
    }
}
