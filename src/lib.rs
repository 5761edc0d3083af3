// stable-engine: collateral-backed stable asset issuance.
// solvency-first architecture: no operation commits unless every touched account is healthy.
// all computation is deterministic; the only external inputs are the token and feed collaborators.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: AccountId, AssetId, Amount, UsdValue, HealthFactor, Bps
//   2.x  math.rs: 256-bit mul_div, decimal rescaling
//   3.x  config.rs: threshold, bonus, min health factor, env presets
//   4.x  token.rs: collateral and stable token collaborators (mocked)
//   5.x  price_feed.rs: oracle adapter, unit prices, per-operation snapshot
//   5.1  registry.rs: allowed collateral assets, parallel to their feeds
//   6.x  ledger.rs: per-account collateral and debt, staged transactions
//   7.x  health.rs: health factor, liquidatable status, mint headroom
//   8.x  engine/: deposit, mint, burn, redeem, liquidate, queries
//   9.x  events.rs: state transition events for audit

// core accounting modules
pub mod engine;
pub mod events;
pub mod health;
pub mod ledger;
pub mod math;
pub mod types;

// collaborator and configuration modules
pub mod config;
pub mod price_feed;
pub mod registry;
pub mod token;

// re exports for convenience
pub use config::*;
pub use engine::*;
pub use events::*;
pub use health::*;
pub use ledger::*;
pub use price_feed::*;
pub use registry::*;
pub use token::*;
pub use types::*;
pub use math::MathError;
