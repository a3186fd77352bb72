// 6.0 custody.rs: collateral vault. the ledger is the only caller allowed to move
// funds; the vault trusts it and keeps no position knowledge of its own.
// in memory only: wallet balances stand in for real token transfers.

use std::collections::HashMap;

use crate::types::{AccountId, Wad};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("caller {caller} is not the vault's ledger")]
    UnauthorizedCaller { caller: AccountId },

    #[error("{account} has {available}, needs {requested}")]
    InsufficientBalance {
        account: AccountId,
        available: Wad,
        requested: Wad,
    },

    #[error("vault holds {available}, cannot release {requested}")]
    InsufficientCustody { available: Wad, requested: Wad },

    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("balance overflow")]
    Overflow,
}

/// Deposit/withdraw capability handed to the ledger.
pub trait Vault {
    /// Pull `amount` from `from`'s wallet into custody.
    fn deposit(&mut self, caller: AccountId, from: AccountId, amount: Wad) -> Result<(), CustodyError>;

    /// Release `amount` from custody to `to`.
    fn withdraw(&mut self, caller: AccountId, to: AccountId, amount: Wad) -> Result<(), CustodyError>;
}

#[derive(Debug, Clone)]
pub struct InMemoryVault {
    ledger: AccountId,
    // trader funds outside the vault
    wallets: HashMap<AccountId, Wad>,
    // collateral currently held
    custody: Wad,
    total_deposited: Wad,
    total_withdrawn: Wad,
}

impl InMemoryVault {
    pub fn new(ledger: AccountId) -> Self {
        Self {
            ledger,
            wallets: HashMap::new(),
            custody: Wad::ZERO,
            total_deposited: Wad::ZERO,
            total_withdrawn: Wad::ZERO,
        }
    }

    /// Credit a trader's wallet (faucet / bridge in).
    pub fn fund(&mut self, account: AccountId, amount: Wad) -> Result<(), CustodyError> {
        let balance = self.wallets.entry(account).or_default();
        *balance = balance.checked_add(amount).map_err(|_| CustodyError::Overflow)?;
        Ok(())
    }

    pub fn balance_of(&self, account: AccountId) -> Wad {
        self.wallets.get(&account).copied().unwrap_or_default()
    }

    pub fn custody(&self) -> Wad {
        self.custody
    }

    pub fn total_deposited(&self) -> Wad {
        self.total_deposited
    }

    pub fn total_withdrawn(&self) -> Wad {
        self.total_withdrawn
    }

    fn check_caller(&self, caller: AccountId) -> Result<(), CustodyError> {
        if caller != self.ledger {
            return Err(CustodyError::UnauthorizedCaller { caller });
        }
        Ok(())
    }
}

impl Vault for InMemoryVault {
    fn deposit(&mut self, caller: AccountId, from: AccountId, amount: Wad) -> Result<(), CustodyError> {
        self.check_caller(caller)?;
        if amount.is_zero() {
            return Err(CustodyError::InvalidAmount);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                account: from,
                available,
                requested: amount,
            });
        }
        // compute everything before touching state
        let custody = self.custody.checked_add(amount).map_err(|_| CustodyError::Overflow)?;
        let total = self.total_deposited.checked_add(amount).map_err(|_| CustodyError::Overflow)?;

        self.wallets.insert(from, Wad::from_raw(available.raw() - amount.raw()));
        self.custody = custody;
        self.total_deposited = total;
        Ok(())
    }

    fn withdraw(&mut self, caller: AccountId, to: AccountId, amount: Wad) -> Result<(), CustodyError> {
        self.check_caller(caller)?;
        if amount.is_zero() {
            return Err(CustodyError::InvalidAmount);
        }
        if self.custody < amount {
            return Err(CustodyError::InsufficientCustody {
                available: self.custody,
                requested: amount,
            });
        }
        let wallet = self
            .balance_of(to)
            .checked_add(amount)
            .map_err(|_| CustodyError::Overflow)?;
        let total = self.total_withdrawn.checked_add(amount).map_err(|_| CustodyError::Overflow)?;

        self.custody = Wad::from_raw(self.custody.raw() - amount.raw());
        self.wallets.insert(to, wallet);
        self.total_withdrawn = total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: AccountId = AccountId(900);
    const ALICE: AccountId = AccountId(1);

    #[test]
    fn deposit_moves_wallet_into_custody() {
        let mut vault = InMemoryVault::new(LEDGER);
        vault.fund(ALICE, Wad::from_units(500)).unwrap();

        vault.deposit(LEDGER, ALICE, Wad::from_units(200)).unwrap();
        assert_eq!(vault.balance_of(ALICE), Wad::from_units(300));
        assert_eq!(vault.custody(), Wad::from_units(200));
        assert_eq!(vault.total_deposited(), Wad::from_units(200));
    }

    #[test]
    fn deposit_rejects_short_wallet() {
        let mut vault = InMemoryVault::new(LEDGER);
        vault.fund(ALICE, Wad::from_units(50)).unwrap();

        let err = vault.deposit(LEDGER, ALICE, Wad::from_units(100)).unwrap_err();
        assert!(matches!(err, CustodyError::InsufficientBalance { .. }));
        assert_eq!(vault.balance_of(ALICE), Wad::from_units(50));
        assert_eq!(vault.custody(), Wad::ZERO);
    }

    #[test]
    fn only_ledger_may_move_funds() {
        let mut vault = InMemoryVault::new(LEDGER);
        vault.fund(ALICE, Wad::from_units(50)).unwrap();

        let err = vault.deposit(ALICE, ALICE, Wad::from_units(10)).unwrap_err();
        assert_eq!(err, CustodyError::UnauthorizedCaller { caller: ALICE });
        let err = vault.withdraw(ALICE, ALICE, Wad::from_units(10)).unwrap_err();
        assert_eq!(err, CustodyError::UnauthorizedCaller { caller: ALICE });
    }

    #[test]
    fn withdraw_limited_by_custody() {
        let mut vault = InMemoryVault::new(LEDGER);
        vault.fund(ALICE, Wad::from_units(100)).unwrap();
        vault.deposit(LEDGER, ALICE, Wad::from_units(100)).unwrap();

        let err = vault.withdraw(LEDGER, ALICE, Wad::from_units(101)).unwrap_err();
        assert!(matches!(err, CustodyError::InsufficientCustody { .. }));

        vault.withdraw(LEDGER, ALICE, Wad::from_units(60)).unwrap();
        assert_eq!(vault.custody(), Wad::from_units(40));
        assert_eq!(vault.balance_of(ALICE), Wad::from_units(60));
        assert_eq!(vault.total_withdrawn(), Wad::from_units(60));
    }
}
