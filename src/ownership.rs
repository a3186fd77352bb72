// 7.0 ownership.rs: transferable ownership token keyed by position id.
// the ledger mints on open and burns on close; holders can transfer in between.
// control of a position follows the token, not whoever opened it.

use std::collections::HashMap;

use crate::types::{AccountId, PositionId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("caller {caller} is not the token's ledger")]
    UnauthorizedCaller { caller: AccountId },

    #[error("{0} has no owner")]
    NonexistentToken(PositionId),

    #[error("{0} is already minted")]
    AlreadyMinted(PositionId),

    #[error("{caller} does not own {position_id}")]
    NotOwner {
        caller: AccountId,
        position_id: PositionId,
    },
}

/// Mint/burn capability handed to the ledger, plus the owner lookup.
pub trait PositionToken {
    fn mint(&mut self, caller: AccountId, owner: AccountId, position_id: PositionId) -> Result<(), OwnershipError>;

    fn burn(&mut self, caller: AccountId, position_id: PositionId) -> Result<(), OwnershipError>;

    fn owner_of(&self, position_id: PositionId) -> Result<AccountId, OwnershipError>;
}

#[derive(Debug, Clone)]
pub struct InMemoryPositionToken {
    ledger: AccountId,
    owners: HashMap<PositionId, AccountId>,
}

impl InMemoryPositionToken {
    pub fn new(ledger: AccountId) -> Self {
        Self {
            ledger,
            owners: HashMap::new(),
        }
    }

    /// Holder-initiated transfer.
    pub fn transfer(
        &mut self,
        caller: AccountId,
        to: AccountId,
        position_id: PositionId,
    ) -> Result<(), OwnershipError> {
        let owner = self.owner_of(position_id)?;
        if owner != caller {
            return Err(OwnershipError::NotOwner {
                caller,
                position_id,
            });
        }
        self.owners.insert(position_id, to);
        Ok(())
    }

    pub fn tokens_of(&self, owner: AccountId) -> Vec<PositionId> {
        let mut ids: Vec<PositionId> = self
            .owners
            .iter()
            .filter(|(_, holder)| **holder == owner)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn supply(&self) -> usize {
        self.owners.len()
    }

    fn check_caller(&self, caller: AccountId) -> Result<(), OwnershipError> {
        if caller != self.ledger {
            return Err(OwnershipError::UnauthorizedCaller { caller });
        }
        Ok(())
    }
}

impl PositionToken for InMemoryPositionToken {
    fn mint(&mut self, caller: AccountId, owner: AccountId, position_id: PositionId) -> Result<(), OwnershipError> {
        self.check_caller(caller)?;
        if self.owners.contains_key(&position_id) {
            return Err(OwnershipError::AlreadyMinted(position_id));
        }
        self.owners.insert(position_id, owner);
        Ok(())
    }

    fn burn(&mut self, caller: AccountId, position_id: PositionId) -> Result<(), OwnershipError> {
        self.check_caller(caller)?;
        self.owners
            .remove(&position_id)
            .map(|_| ())
            .ok_or(OwnershipError::NonexistentToken(position_id))
    }

    fn owner_of(&self, position_id: PositionId) -> Result<AccountId, OwnershipError> {
        self.owners
            .get(&position_id)
            .copied()
            .ok_or(OwnershipError::NonexistentToken(position_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: AccountId = AccountId(900);
    const ALICE: AccountId = AccountId(1);
    const BOB: AccountId = AccountId(2);

    #[test]
    fn mint_then_burn() {
        let mut token = InMemoryPositionToken::new(LEDGER);
        token.mint(LEDGER, ALICE, PositionId(1)).unwrap();
        assert_eq!(token.owner_of(PositionId(1)).unwrap(), ALICE);
        assert_eq!(token.supply(), 1);

        token.burn(LEDGER, PositionId(1)).unwrap();
        assert_eq!(
            token.owner_of(PositionId(1)),
            Err(OwnershipError::NonexistentToken(PositionId(1)))
        );
    }

    #[test]
    fn double_mint_rejected() {
        let mut token = InMemoryPositionToken::new(LEDGER);
        token.mint(LEDGER, ALICE, PositionId(1)).unwrap();
        assert_eq!(
            token.mint(LEDGER, BOB, PositionId(1)),
            Err(OwnershipError::AlreadyMinted(PositionId(1)))
        );
    }

    #[test]
    fn only_ledger_mints_and_burns() {
        let mut token = InMemoryPositionToken::new(LEDGER);
        assert!(matches!(
            token.mint(ALICE, ALICE, PositionId(1)),
            Err(OwnershipError::UnauthorizedCaller { .. })
        ));
        token.mint(LEDGER, ALICE, PositionId(1)).unwrap();
        assert!(matches!(
            token.burn(ALICE, PositionId(1)),
            Err(OwnershipError::UnauthorizedCaller { .. })
        ));
    }

    #[test]
    fn transfer_requires_holder() {
        let mut token = InMemoryPositionToken::new(LEDGER);
        token.mint(LEDGER, ALICE, PositionId(3)).unwrap();

        assert!(matches!(
            token.transfer(BOB, BOB, PositionId(3)),
            Err(OwnershipError::NotOwner { .. })
        ));
        token.transfer(ALICE, BOB, PositionId(3)).unwrap();
        assert_eq!(token.owner_of(PositionId(3)).unwrap(), BOB);
        assert_eq!(token.tokens_of(BOB), vec![PositionId(3)]);
        assert!(token.tokens_of(ALICE).is_empty());
    }
}
