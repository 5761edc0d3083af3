// 9.0: every committed state change produces an event. used for audit trails and notifying
// external observers. events are staged with the ledger transaction and only published when
// the operation commits, so a rolled back operation leaves no trace here.

use crate::types::{AccountId, Amount, AssetId, HealthFactor, Timestamp, UsdValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // Collateral events
    CollateralDeposited(CollateralDepositedEvent),
    CollateralRedeemed(CollateralRedeemedEvent),

    // Debt events
    StableMinted(StableMintedEvent),
    DebtBurned(DebtBurnedEvent),

    // Risk events
    Liquidation(LiquidationEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralDepositedEvent {
    pub account: AccountId,
    pub asset: AssetId,
    pub amount: Amount,
}

// `from` is the position debited, `to` receives the tokens. they differ on liquidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralRedeemedEvent {
    pub from: AccountId,
    pub to: AccountId,
    pub asset: AssetId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableMintedEvent {
    pub account: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtBurnedEvent {
    pub account: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub liquidator: AccountId,
    pub account: AccountId,
    pub asset: AssetId,
    pub debt_covered: UsdValue,
    pub collateral_seized: Amount,
    pub bonus: Amount,
    pub health_before: HealthFactor,
    pub health_after: HealthFactor,
}
