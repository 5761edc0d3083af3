//! Fixed-point helpers.
//!
//! Amounts are raw `u128` integers. Products like `amount * price` or
//! `value * PRECISION` routinely exceed `u128` at 18 decimals, so every
//! multiply-then-divide goes through a 256-bit intermediate and is narrowed
//! back with an explicit overflow check. All division floors.

use primitive_types::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,
}

/// `a * b / denominator`, floored.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let result = U256::from(a) * U256::from(b) / U256::from(denominator);
    narrow(result)
}

/// Like [`mul_div`] but clamps to `u128::MAX` instead of failing.
pub fn mul_div_saturating(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    match mul_div(a, b, denominator) {
        Err(MathError::Overflow) => Ok(u128::MAX),
        other => other,
    }
}

pub fn pow10(exp: u8) -> Result<u128, MathError> {
    10u128.checked_pow(exp as u32).ok_or(MathError::Overflow)
}

/// Rescale `value` from `from` decimals to `to` decimals. Downscaling floors.
pub fn rescale(value: u128, from: u8, to: u8) -> Result<u128, MathError> {
    if from == to {
        Ok(value)
    } else if from < to {
        value.checked_mul(pow10(to - from)?).ok_or(MathError::Overflow)
    } else {
        Ok(value / pow10(from - to)?)
    }
}

pub fn to_decimal(raw: u128, decimals: u8) -> Option<Decimal> {
    let signed = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(signed, decimals as u32).ok()
}

pub fn from_decimal(value: Decimal, decimals: u8) -> Option<u128> {
    if value.is_sign_negative() {
        return None;
    }
    let scale = Decimal::try_from_i128_with_scale(i128::try_from(pow10(decimals).ok()?).ok()?, 0).ok()?;
    value.checked_mul(scale)?.trunc().to_u128()
}

fn narrow(value: U256) -> Result<u128, MathError> {
    if value > U256::from(u128::MAX) {
        Err(MathError::Overflow)
    } else {
        Ok(value.low_u128())
    }
}
