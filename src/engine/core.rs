// 8.0 engine/core.rs: main engine. holds the registry, the ledger, collaborators, event log.

use super::config::EngineConfig;
use super::results::EngineError;
use super::settlement::Settlement;
use crate::config::{ConfigError, MAX_DECIMALS};
use crate::events::{Event, EventId, EventPayload};
use crate::health::{calculate_health_factor, HealthParams};
use crate::ledger::{AccountPosition, Changeset, PositionLedger};
use crate::price_feed::{PriceFeed, PriceSnapshot};
use crate::registry::CollateralRegistry;
use crate::token::{CollateralToken, StableToken};
use crate::types::{AccountId, HealthFactor, Timestamp};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

/** 8.1: main engine struct. all state lives here */
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) params: HealthParams,
    pub(super) registry: CollateralRegistry,
    pub(super) stable: Rc<dyn StableToken>,
    pub(super) usd_decimals: u8,
    pub(super) ledger: PositionLedger,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl Engine {
    /// `tokens[i]` is priced by `feeds[i]`. Fails without building anything on a
    /// length mismatch, a duplicate asset, bad decimals or invalid risk params.
    pub fn new(
        config: EngineConfig,
        tokens: Vec<Rc<dyn CollateralToken>>,
        feeds: Vec<Rc<dyn PriceFeed>>,
        stable: Rc<dyn StableToken>,
    ) -> Result<Self, EngineError> {
        let params = HealthParams::from_risk(&config.risk)?;
        let registry = CollateralRegistry::new(tokens, feeds)?;

        let usd_decimals = stable.decimals();
        if usd_decimals > MAX_DECIMALS {
            return Err(ConfigError::UnsupportedDecimals {
                decimals: usd_decimals,
            }
            .into());
        }

        info!(
            assets = registry.len(),
            threshold_bps = params.liquidation_threshold.value(),
            bonus_bps = params.liquidation_bonus.value(),
            min_health_factor = %params.min_health_factor,
            "engine initialised"
        );

        Ok(Self {
            config,
            params,
            registry,
            stable,
            usd_decimals,
            ledger: PositionLedger::new(),
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_millis(0),
        })
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis().saturating_add(millis));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &CollateralRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(super) fn prices(&self) -> PriceSnapshot<'_> {
        PriceSnapshot::new(&self.registry, self.usd_decimals)
    }

    pub(super) fn settlement(&self) -> Settlement<'_> {
        Settlement::new(self.config.engine_account, self.stable.as_ref())
    }

    /// Health factor of a (possibly staged) position. debt-free positions never touch a feed.
    pub(super) fn health_factor_of(
        &self,
        position: &AccountPosition,
        prices: &mut PriceSnapshot<'_>,
    ) -> Result<HealthFactor, EngineError> {
        if position.debt_minted.is_zero() {
            return Ok(HealthFactor::MAX);
        }
        let collateral = prices.total_collateral_usd(position)?;
        Ok(calculate_health_factor(
            position.debt_minted,
            collateral,
            self.params.liquidation_threshold,
        )?)
    }

    pub(super) fn ensure_healthy(
        &self,
        account: AccountId,
        position: &AccountPosition,
        prices: &mut PriceSnapshot<'_>,
    ) -> Result<HealthFactor, EngineError> {
        let health_factor = self.health_factor_of(position, prices)?;
        if health_factor < self.params.min_health_factor {
            return Err(EngineError::HealthFactorBroken {
                account,
                health_factor,
                minimum: self.params.min_health_factor,
            });
        }
        Ok(health_factor)
    }

    pub(super) fn commit(&mut self, changeset: Changeset) {
        for payload in self.ledger.apply(changeset) {
            self.emit_event(payload);
        }
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        debug!(event_id = event.id.0, payload = ?event.payload, "event");

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}

// log and pass through. every rejected operation goes through here.
pub(super) fn rejected(operation: &'static str, account: AccountId, err: EngineError) -> EngineError {
    warn!(operation, %account, kind = ?err.kind(), error = %err, "operation rejected");
    err
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("params", &self.params)
            .field("registry", &self.registry)
            .field("usd_decimals", &self.usd_decimals)
            .field("ledger", &self.ledger)
            .field("events", &self.events.len())
            .field("current_time", &self.current_time)
            .finish()
    }
}
