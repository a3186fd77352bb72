// vamm-ledger: perpetual positions priced by a virtual constant-product curve.
// no order book and no counterparties: every trade swaps against virtual
// reserves, and the only real money is the collateral held in the vault.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: MarketId, PositionId, AccountId, Side, Wad
//   2.x  math.rs: 18 decimal fixed point, 256 bit mul_div
//   3.x  amm.rs: open/close formulas over the virtual reserves
//   4.x  market.rs: ledger market record, status projection, invariant
//   5.x  position.rs: position record + trader facing view
//   6.x  custody.rs: collateral vault (in memory)
//   7.x  ownership.rs: transferable position token (in memory)
//   8.x  sync.rs: authority -> ledger commands
//   9.x  ledger/: clearing ledger: positions, quotes, sync entry points
//   10.x lifecycle.rs: market lifecycle authority
//   11.x config.rs: accounts, seeded markets, env presets
//   12.x views.rs: read-only market/position/portfolio aggregation
//   13.x deployment.rs: config -> wired system
//   14.x events.rs: state transition events for audit

// pricing core
pub mod amm;
pub mod math;
pub mod types;

// state
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod market;
pub mod position;
pub mod sync;

// collaborators
pub mod custody;
pub mod ownership;

// integration modules
pub mod config;
pub mod deployment;
pub mod views;

// re exports for convenience
pub use events::*;
pub use ledger::*;
pub use lifecycle::*;
pub use market::*;
pub use position::*;
pub use sync::*;
pub use types::*;
pub use amm::{CloseFill, OpenFill};
pub use config::{ConfigError, Environment, MarketSeed, ProtocolConfig};
pub use custody::{CustodyError, InMemoryVault, Vault};
pub use deployment::{Deployment, DeploymentError, InMemoryLedger};
pub use math::{MathError, WAD, WAD_DECIMALS};
pub use ownership::{InMemoryPositionToken, OwnershipError, PositionToken};
pub use views::{market_overview, portfolio, position_overview, MarketOverview, Portfolio, PositionOverview};
