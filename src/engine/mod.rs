// 8.0: the stable engine. the only entry point that mutates positions.
// every operation validates, stages ledger effects, checks health against the staged
// state and settles with the token collaborators, then commits or discards as a whole.
// deterministic and event-driven; the only outside input is what the feeds report.

mod collateral;
mod config;
mod core;
mod debt;
mod liquidations;
mod queries;
mod results;
mod settlement;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{AccountInformation, EngineError, ErrorKind, LiquidationResult, SystemTotals, TokenKind};
