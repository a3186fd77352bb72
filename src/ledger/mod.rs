// 9.0: clearing ledger. the only writer of trade-driven state: per-market virtual
// reserves, position records, position id allocation. lifecycle changes arrive
// from the authority as sync commands.

mod authority;
mod config;
mod core;
mod positions;
mod quotes;
mod results;

pub use config::LedgerConfig;
pub use core::ClearingLedger;
pub use results::{CloseQuote, CloseReceipt, LedgerError, OpenQuote};
