// 13.0 deployment.rs: wires a ProtocolConfig into a running system. vault and
// token trust the ledger account, the ledger trusts the authority account, the
// authority trusts the operator.

use thiserror::Error;

use crate::config::{ConfigError, ProtocolConfig};
use crate::custody::InMemoryVault;
use crate::ledger::ClearingLedger;
use crate::lifecycle::{AuthorityError, MarketAuthority};
use crate::ownership::InMemoryPositionToken;
use crate::types::{MarketId, Wad};

pub type InMemoryLedger = ClearingLedger<InMemoryVault, InMemoryPositionToken>;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed reserves for {0} do not fit the ledger scale")]
    UnrepresentableReserves(MarketId),

    #[error("Bootstrap failed: {0}")]
    Authority(#[from] AuthorityError),
}

#[derive(Debug)]
pub struct Deployment {
    pub config: ProtocolConfig,
    pub authority: MarketAuthority,
    pub ledger: InMemoryLedger,
}

impl Deployment {
    pub fn from_config(config: ProtocolConfig) -> Result<Self, DeploymentError> {
        config.validate()?;
        let ledger_config = config.ledger_config();
        let ledger = ClearingLedger::new(
            ledger_config.clone(),
            InMemoryVault::new(ledger_config.ledger_account),
            InMemoryPositionToken::new(ledger_config.ledger_account),
        );
        let authority = MarketAuthority::new(config.authority_config());

        tracing::info!(
            operator = %config.operator,
            authority = %config.authority_account,
            ledger = %config.ledger_account,
            markets = config.markets.len(),
            "deployment wired"
        );
        Ok(Self {
            config,
            authority,
            ledger,
        })
    }

    /// Create and list every seeded market. Returns the ids in config order.
    pub fn bootstrap(&mut self) -> Result<Vec<MarketId>, DeploymentError> {
        let operator = self.config.operator;
        let mut listed = Vec::with_capacity(self.config.markets.len());

        for seed in &self.config.markets {
            let reserve_base = Wad::from_decimal(seed.reserve_base)
                .ok_or(DeploymentError::UnrepresentableReserves(seed.id))?;
            let reserve_asset = Wad::from_decimal(seed.reserve_asset)
                .ok_or(DeploymentError::UnrepresentableReserves(seed.id))?;

            self.authority
                .create_market(operator, &mut self.ledger, seed.id, reserve_base, reserve_asset)?;
            self.authority.list_market(operator, &mut self.ledger, seed.id)?;
            tracing::info!(market_id = %seed.id, symbol = %seed.symbol, "market listed");
            listed.push(seed.id);
        }
        Ok(listed)
    }

    pub fn set_time(&mut self, timestamp: crate::types::Timestamp) {
        self.authority.set_time(timestamp);
        self.ledger.set_time(timestamp);
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.authority.advance_time(millis);
        self.ledger.advance_time(millis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecycleStatus;
    use crate::market::MarketStatus;
    use crate::types::Timestamp;

    #[test]
    fn bootstrap_lists_seeded_markets() {
        let mut deployment = Deployment::from_config(ProtocolConfig::testnet()).unwrap();
        let ids = deployment.bootstrap().unwrap();
        assert_eq!(ids, vec![MarketId(1), MarketId(2)]);

        for id in ids {
            assert_eq!(deployment.authority.status(id), LifecycleStatus::Active);
            assert_eq!(deployment.ledger.get_market(id).unwrap().status, MarketStatus::Active);
        }
        assert_eq!(
            deployment.ledger.get_mark_price(MarketId(1)).unwrap(),
            Wad::from_units(2_000)
        );
    }

    #[test]
    fn bootstrap_twice_fails() {
        let mut deployment = Deployment::from_config(ProtocolConfig::default()).unwrap();
        deployment.bootstrap().unwrap();
        assert!(matches!(
            deployment.bootstrap(),
            Err(DeploymentError::Authority(AuthorityError::MarketAlreadyExists(_)))
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ProtocolConfig {
            max_events: 0,
            ..ProtocolConfig::default()
        };
        assert!(matches!(
            Deployment::from_config(config),
            Err(DeploymentError::Config(ConfigError::InvalidEventLog))
        ));
    }

    #[test]
    fn clocks_move_together() {
        let mut deployment = Deployment::from_config(ProtocolConfig::default()).unwrap();
        deployment.set_time(Timestamp::from_millis(1_000));
        deployment.advance_time(500);
        assert_eq!(deployment.authority.time(), Timestamp::from_millis(1_500));
        assert_eq!(deployment.ledger.time(), Timestamp::from_millis(1_500));
    }
}
