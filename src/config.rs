// 11.0 config.rs: protocol settings in one place. accounts, event log bounds,
// markets seeded at deployment.
// 11.1 reserves are written in human units and scaled to Wad at bootstrap.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::ledger::LedgerConfig;
use crate::lifecycle::AuthorityConfig;
use crate::types::{AccountId, MarketId};

// One market created and listed by `Deployment::bootstrap`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSeed {
    pub id: MarketId,
    // Display name (e.g. "ETH-PERP")
    pub symbol: String,
    // Virtual base reserve, in collateral units
    pub reserve_base: Decimal,
    // Virtual asset reserve
    pub reserve_asset: Decimal,
}

impl MarketSeed {
    pub fn new(id: u64, symbol: &str, reserve_base: Decimal, reserve_asset: Decimal) -> Self {
        Self {
            id: MarketId(id),
            symbol: symbol.to_string(),
            reserve_base,
            reserve_asset,
        }
    }

    /// Starting mark price, `reserve_base / reserve_asset`.
    pub fn initial_price(&self) -> Option<Decimal> {
        self.reserve_base.checked_div(self.reserve_asset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    // Drives lifecycle transitions
    pub operator: AccountId,
    // Identity the authority uses toward the ledger
    pub authority_account: AccountId,
    // Identity the ledger uses toward vault and token
    pub ledger_account: AccountId,
    // Per-component event log capacity
    pub max_events: usize,
    pub markets: Vec<MarketSeed>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            operator: AccountId(1),
            authority_account: AccountId(900),
            ledger_account: AccountId(901),
            max_events: 100_000,
            markets: vec![MarketSeed::new(1, "ETH-PERP", dec!(10000), dec!(1000))],
        }
    }
}

impl ProtocolConfig {
    // deeper pools than dev so test traders see realistic slippage
    pub fn testnet() -> Self {
        Self {
            max_events: 50_000,
            markets: vec![
                MarketSeed::new(1, "ETH-PERP", dec!(2000000), dec!(1000)),
                MarketSeed::new(2, "BTC-PERP", dec!(30000000), dec!(500)),
            ],
            ..Self::default()
        }
    }

    pub fn mainnet() -> Self {
        Self {
            operator: AccountId(10),
            authority_account: AccountId(1_000),
            ledger_account: AccountId(1_001),
            max_events: 1_000_000,
            markets: vec![
                MarketSeed::new(1, "ETH-PERP", dec!(200000000), dec!(100000)),
                MarketSeed::new(2, "BTC-PERP", dec!(3000000000), dec!(50000)),
                MarketSeed::new(3, "SOL-PERP", dec!(15000000), dec!(100000)),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    /// `VAMM_ENV` picks the preset (development when unset), `VAMM_MAX_EVENTS`
    /// overrides the event log capacity.
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let environment = match env_map.get("VAMM_ENV").map(|s| s.to_lowercase()) {
            None => Environment::Development,
            Some(name) => match name.as_str() {
                "development" | "dev" => Environment::Development,
                "testnet" => Environment::Testnet,
                "mainnet" => Environment::Mainnet,
                _ => return Err(ConfigError::InvalidEnvironment(name)),
            },
        };

        let mut config = environment.config();
        if let Some(raw) = env_map.get("VAMM_MAX_EVENTS") {
            config.max_events = raw
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("VAMM_MAX_EVENTS".to_string(), raw.clone()))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let accounts = [self.operator, self.authority_account, self.ledger_account];
        if accounts.iter().any(|a| a.0 == 0) {
            return Err(ConfigError::InvalidAccounts {
                reason: "account ids must be non-zero".to_string(),
            });
        }
        if self.operator == self.authority_account
            || self.operator == self.ledger_account
            || self.authority_account == self.ledger_account
        {
            return Err(ConfigError::InvalidAccounts {
                reason: "operator, authority and ledger accounts must differ".to_string(),
            });
        }

        if self.max_events == 0 {
            return Err(ConfigError::InvalidEventLog);
        }

        let mut seen = HashSet::new();
        for seed in &self.markets {
            if !seen.insert(seed.id) {
                return Err(ConfigError::DuplicateMarket(seed.id));
            }
            if seed.reserve_base <= Decimal::ZERO || seed.reserve_asset <= Decimal::ZERO {
                return Err(ConfigError::InvalidMarket {
                    market_id: seed.id,
                    reason: "reserves must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            ledger_account: self.ledger_account,
            authority: self.authority_account,
            max_events: self.max_events,
        }
    }

    pub fn authority_config(&self) -> AuthorityConfig {
        AuthorityConfig {
            authority_account: self.authority_account,
            operator: self.operator,
            max_events: self.max_events,
        }
    }

    pub fn market(&self, id: MarketId) -> Option<&MarketSeed> {
        self.markets.iter().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid accounts: {reason}")]
    InvalidAccounts { reason: String },

    #[error("max_events must be positive")]
    InvalidEventLog,

    #[error("Market {0} configured twice")]
    DuplicateMarket(MarketId),

    #[error("Invalid market {market_id}: {reason}")]
    InvalidMarket { market_id: MarketId, reason: String },

    #[error("Unknown environment: {0}")]
    InvalidEnvironment(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn config(&self) -> ProtocolConfig {
        match self {
            Environment::Development => ProtocolConfig::default(),
            Environment::Testnet => ProtocolConfig::testnet(),
            Environment::Mainnet => ProtocolConfig::mainnet(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_valid() {
        assert!(Environment::Development.config().validate().is_ok());
        assert!(Environment::Testnet.config().validate().is_ok());
        assert!(Environment::Mainnet.config().validate().is_ok());
    }

    #[test]
    fn test_default_market_price() {
        let config = ProtocolConfig::default();
        let seed = config.market(MarketId(1)).unwrap();
        assert_eq!(seed.initial_price(), Some(dec!(10)));
    }

    #[test]
    fn test_duplicate_accounts() {
        let config = ProtocolConfig {
            ledger_account: AccountId(900),
            ..ProtocolConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAccounts { .. })));

        let config = ProtocolConfig {
            operator: AccountId(0),
            ..ProtocolConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAccounts { .. })));
    }

    #[test]
    fn test_zero_events() {
        let config = ProtocolConfig {
            max_events: 0,
            ..ProtocolConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidEventLog));
    }

    #[test]
    fn test_duplicate_market() {
        let mut config = ProtocolConfig::default();
        config.markets.push(MarketSeed::new(1, "ETH-PERP-2", dec!(1), dec!(1)));
        assert_eq!(config.validate(), Err(ConfigError::DuplicateMarket(MarketId(1))));
    }

    #[test]
    fn test_non_positive_reserves() {
        let mut config = ProtocolConfig::default();
        config.markets[0].reserve_asset = dec!(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMarket { .. })));

        config.markets[0].reserve_asset = dec!(-5);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMarket { .. })));
    }

    #[test]
    fn test_env_map_selects_preset() {
        let mut env_map = HashMap::new();
        assert_eq!(ProtocolConfig::from_env_map(env_map.clone()).unwrap(), ProtocolConfig::default());

        env_map.insert("VAMM_ENV".to_string(), "Testnet".to_string());
        env_map.insert("VAMM_MAX_EVENTS".to_string(), "42".to_string());
        let config = ProtocolConfig::from_env_map(env_map).unwrap();
        assert_eq!(config.markets.len(), 2);
        assert_eq!(config.max_events, 42);
    }

    #[test]
    fn test_env_map_rejects_bad_values() {
        let mut env_map = HashMap::new();
        env_map.insert("VAMM_ENV".to_string(), "staging".to_string());
        assert!(matches!(
            ProtocolConfig::from_env_map(env_map),
            Err(ConfigError::InvalidEnvironment(_))
        ));

        let mut env_map = HashMap::new();
        env_map.insert("VAMM_MAX_EVENTS".to_string(), "lots".to_string());
        assert!(matches!(
            ProtocolConfig::from_env_map(env_map),
            Err(ConfigError::InvalidEnvVar(..))
        ));

        let mut env_map = HashMap::new();
        env_map.insert("VAMM_MAX_EVENTS".to_string(), "0".to_string());
        assert_eq!(ProtocolConfig::from_env_map(env_map), Err(ConfigError::InvalidEventLog));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ProtocolConfig::mainnet();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ProtocolConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_json_invalid() {
        assert!(matches!(ProtocolConfig::from_json_str("{"), Err(ConfigError::Parse(_))));

        let mut config = ProtocolConfig::default();
        config.max_events = 0;
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ProtocolConfig::from_json_str(&json), Err(ConfigError::InvalidEventLog));
    }

    #[test]
    fn test_component_configs() {
        let config = ProtocolConfig::testnet();
        assert_eq!(config.ledger_config().authority, config.authority_account);
        assert_eq!(config.authority_config().operator, config.operator);
    }
}
