//! Engine configuration options.

use crate::config::RiskParams;
use crate::types::AccountId;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Account the engine holds custody under. Collateral and stable pulled from
    /// users land here and payouts leave from here.
    pub engine_account: AccountId,
    /// Solvency parameters.
    pub risk: RiskParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            engine_account: AccountId(0),
            risk: RiskParams::default(),
        }
    }
}
