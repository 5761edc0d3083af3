//! Collateral registry.
//!
//! Fixed at construction from parallel lists of collateral tokens and price feeds,
//! index `i` of one pairing with index `i` of the other. There is no way to add or
//! remove an asset afterwards.

use crate::config::{ConfigError, MAX_DECIMALS};
use crate::price_feed::PriceFeed;
use crate::token::CollateralToken;
use crate::types::{AssetId, FeedId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown collateral asset {0}")]
pub struct UnknownAsset(pub AssetId);

/// One allowed collateral asset and the feed that prices it.
#[derive(Clone)]
pub struct CollateralAsset {
    id: AssetId,
    decimals: u8,
    token: Rc<dyn CollateralToken>,
    feed: Rc<dyn PriceFeed>,
}

impl CollateralAsset {
    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn token(&self) -> &Rc<dyn CollateralToken> {
        &self.token
    }

    pub fn feed(&self) -> &Rc<dyn PriceFeed> {
        &self.feed
    }
}

impl fmt::Debug for CollateralAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollateralAsset")
            .field("id", &self.id)
            .field("decimals", &self.decimals)
            .field("feed", &self.feed.feed_id())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CollateralRegistry {
    assets: Vec<CollateralAsset>,
    index: HashMap<AssetId, usize>,
}

impl CollateralRegistry {
    /// Fails before building anything if the lists differ in length, an asset repeats,
    /// or a token reports a precision the fixed-point math cannot hold.
    pub fn new(
        tokens: Vec<Rc<dyn CollateralToken>>,
        feeds: Vec<Rc<dyn PriceFeed>>,
    ) -> Result<Self, ConfigError> {
        if tokens.len() != feeds.len() {
            return Err(ConfigError::LengthMismatch {
                assets: tokens.len(),
                feeds: feeds.len(),
            });
        }

        let mut assets = Vec::with_capacity(tokens.len());
        let mut index = HashMap::with_capacity(tokens.len());

        for (token, feed) in tokens.into_iter().zip(feeds) {
            let id = token.asset_id();
            let decimals = token.decimals();
            if decimals > MAX_DECIMALS {
                return Err(ConfigError::UnsupportedDecimals { decimals });
            }
            if index.insert(id, assets.len()).is_some() {
                return Err(ConfigError::DuplicateAsset(id));
            }
            assets.push(CollateralAsset {
                id,
                decimals,
                token,
                feed,
            });
        }

        Ok(Self { assets, index })
    }

    pub fn is_allowed(&self, asset: AssetId) -> bool {
        self.index.contains_key(&asset)
    }

    pub fn get(&self, asset: AssetId) -> Option<&CollateralAsset> {
        self.index.get(&asset).map(|&i| &self.assets[i])
    }

    pub fn require(&self, asset: AssetId) -> Result<&CollateralAsset, UnknownAsset> {
        self.get(asset).ok_or(UnknownAsset(asset))
    }

    pub fn feed_for(&self, asset: AssetId) -> Result<&Rc<dyn PriceFeed>, UnknownAsset> {
        self.require(asset).map(CollateralAsset::feed)
    }

    pub fn feed_id_for(&self, asset: AssetId) -> Result<FeedId, UnknownAsset> {
        self.feed_for(asset).map(|feed| feed.feed_id())
    }

    /// Allowed assets in registration order.
    pub fn asset_ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.assets.iter().map(|a| a.id)
    }

    pub fn assets(&self) -> &[CollateralAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price_feed::MockPriceFeed;
    use crate::token::MockCollateralToken;
    use crate::types::AccountId;

    fn token(id: u32, decimals: u8) -> Rc<dyn CollateralToken> {
        Rc::new(MockCollateralToken::new(AssetId(id), decimals, AccountId(0)))
    }

    fn feed(id: u32) -> Rc<dyn PriceFeed> {
        Rc::new(MockPriceFeed::new(FeedId(id), 1, 0))
    }

    #[test]
    fn builds_parallel_mapping() {
        let registry =
            CollateralRegistry::new(vec![token(1, 18), token(2, 8)], vec![feed(10), feed(20)]).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.is_allowed(AssetId(1)));
        assert!(!registry.is_allowed(AssetId(3)));
        assert_eq!(registry.feed_id_for(AssetId(2)), Ok(FeedId(20)));
        assert_eq!(registry.asset_ids().collect::<Vec<_>>(), vec![AssetId(1), AssetId(2)]);
        assert_eq!(registry.get(AssetId(2)).unwrap().decimals(), 8);
    }

    #[test]
    fn length_mismatch_fails() {
        let result = CollateralRegistry::new(vec![token(1, 18), token(2, 18)], vec![feed(10)]);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::LengthMismatch { assets: 2, feeds: 1 }
        );

        let result = CollateralRegistry::new(vec![], vec![feed(10)]);
        assert!(matches!(result, Err(ConfigError::LengthMismatch { .. })));
    }

    #[test]
    fn duplicate_asset_fails() {
        let result = CollateralRegistry::new(vec![token(1, 18), token(1, 18)], vec![feed(10), feed(20)]);
        assert_eq!(result.unwrap_err(), ConfigError::DuplicateAsset(AssetId(1)));
    }

    #[test]
    fn oversized_decimals_fail() {
        let result = CollateralRegistry::new(vec![token(1, 40)], vec![feed(10)]);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::UnsupportedDecimals { decimals: 40 }
        );
    }

    #[test]
    fn unknown_asset_lookup() {
        let registry = CollateralRegistry::new(vec![token(1, 18)], vec![feed(10)]).unwrap();
        assert_eq!(registry.feed_id_for(AssetId(7)), Err(UnknownAsset(AssetId(7))));
        assert!(registry.require(AssetId(7)).is_err());
    }
}
