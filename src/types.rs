// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, raw token amounts, usd values, health factors, bps, timestamps. each is a newtype
// so the compiler catches amount/value mixups.

use crate::math::{self, MathError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

// identifies a collateral token. stable across the engine lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedId(pub u32);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account#{}", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feed#{}", self.0)
    }
}

// 1.1: raw token quantity in the token's own decimals. collateral and stable debt both use this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    // whole units scaled by 10^decimals. 15 tokens at 18 decimals = 15e18 raw.
    pub fn from_units(units: u128, decimals: u8) -> Result<Self, MathError> {
        let scale = math::pow10(decimals)?;
        units.checked_mul(scale).map(Self).ok_or(MathError::Overflow)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Amount) -> Result<Self, MathError> {
        self.0.checked_add(other.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn checked_sub(&self, other: Amount) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    // share of this amount in basis points, floored
    pub fn bps_of(&self, bps: Bps) -> Result<Self, MathError> {
        math::mul_div(self.0, bps.value() as u128, Bps::DENOMINATOR).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: usd value in the stable asset's precision. 1 stable unit == 1 usd unit, so debt
// (an Amount of stable) converts losslessly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UsdValue(u128);

impl UsdValue {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn from_stable(amount: Amount) -> Self {
        Self(amount.raw())
    }

    pub fn as_stable(&self) -> Amount {
        Amount::new(self.0)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: UsdValue) -> Result<Self, MathError> {
        self.0.checked_add(other.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn to_decimal(&self, decimals: u8) -> Option<Decimal> {
        math::to_decimal(self.0, decimals)
    }
}

impl fmt::Display for UsdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.3: health factor in 1e18 fixed point. 1e18 == 1.0. an account with no debt sits at MAX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HealthFactor(u128);

impl HealthFactor {
    pub const PRECISION: u128 = 1_000_000_000_000_000_000;
    pub const DECIMALS: u8 = 18;
    pub const ONE: Self = Self(Self::PRECISION);
    pub const MAX: Self = Self(u128::MAX);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn from_decimal(value: Decimal) -> Option<Self> {
        math::from_decimal(value, Self::DECIMALS).map(Self)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        self.0 == u128::MAX
    }

    // None for the no-debt sentinel, which has no meaningful decimal form
    pub fn to_decimal(&self) -> Option<Decimal> {
        if self.is_max() {
            return None;
        }
        math::to_decimal(self.0, Self::DECIMALS)
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(d) => write!(f, "{}", d.normalize()),
            None if self.is_max() => write!(f, "inf"),
            None => write!(f, "{}e-18", self.0),
        }
    }
}

// 1.4: basis points. 100 bps = 1%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bps(u32);

impl Bps {
    pub const DENOMINATOR: u128 = 10_000;

    pub const fn new(bps: u32) -> Self {
        Self(bps)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 4)
    }
}

// 1.5: millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}
