//! Ledger configuration options.

use crate::types::AccountId;
use serde::{Deserialize, Serialize};

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Account the ledger acts under when calling the vault and token.
    pub ledger_account: AccountId,
    /// The only sender allowed on the authority entry points.
    pub authority: AccountId,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_account: AccountId(901),
            authority: AccountId(900),
            max_events: 100_000,
        }
    }
}
