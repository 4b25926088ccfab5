//! Value-transfer capability used to escrow deposits and pay refunds.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;
use vickrey_types::{Address, Amount};

/// Errors raised by a [`Vault`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Insufficient funds: need {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Insufficient escrow: need {required}, held {held}")]
    InsufficientEscrow { required: Amount, held: Amount },

    #[error("Zero-value transfers are not accepted")]
    ZeroTransfer,

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Escrow and payout of a fungible unit of value.
///
/// `escrow` is called while the registry holds the auction lock and must not
/// call back into the registry. `disburse` runs after the lock is released
/// and may re-enter.
pub trait Vault: Send + Sync {
    /// Whether zero-value transfers are allowed.
    fn accepts_zero(&self) -> bool {
        false
    }

    /// Move `amount` from `from` into the engine's custody.
    fn escrow(&self, from: &Address, amount: Amount) -> Result<(), TransferError>;

    /// Release `amount` from the engine's custody to `to`.
    fn disburse(&self, to: &Address, amount: Amount) -> Result<(), TransferError>;
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<Address, Amount>,
    held: Amount,
}

/// In-memory vault with per-address balances and a single custody pool.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: Mutex<LedgerInner>,
    accept_zero: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that also accepts zero-value transfers.
    pub fn accepting_zero() -> Self {
        Self {
            accept_zero: true,
            ..Self::default()
        }
    }

    /// Credit `address` out of thin air. Used for genesis funding.
    pub fn mint(&self, address: Address, amount: Amount) {
        let mut inner = self.inner.lock();
        let balance = inner.balances.entry(address).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Spendable balance of `address`.
    pub fn balance(&self, address: &Address) -> Amount {
        self.inner.lock().balances.get(address).copied().unwrap_or(0)
    }

    /// Total value currently in custody.
    pub fn held(&self) -> Amount {
        self.inner.lock().held
    }

    /// Snapshot of all balances.
    pub fn balances(&self) -> Vec<(Address, Amount)> {
        let mut out: Vec<_> = self
            .inner
            .lock()
            .balances
            .iter()
            .map(|(addr, amount)| (*addr, *amount))
            .collect();
        out.sort();
        out
    }

    fn check_zero(&self, amount: Amount) -> Result<(), TransferError> {
        if amount == 0 && !self.accept_zero {
            return Err(TransferError::ZeroTransfer);
        }
        Ok(())
    }
}

impl Vault for Ledger {
    fn accepts_zero(&self) -> bool {
        self.accept_zero
    }

    fn escrow(&self, from: &Address, amount: Amount) -> Result<(), TransferError> {
        self.check_zero(amount)?;
        let mut inner = self.inner.lock();
        let available = inner.balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        inner.balances.insert(*from, available - amount);
        inner.held += amount;
        Ok(())
    }

    fn disburse(&self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        self.check_zero(amount)?;
        let mut inner = self.inner.lock();
        if inner.held < amount {
            return Err(TransferError::InsufficientEscrow {
                required: amount,
                held: inner.held,
            });
        }
        inner.held -= amount;
        *inner.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_and_disburse() {
        let ledger = Ledger::new();
        let addr = [1u8; 32];

        assert_eq!(ledger.balance(&addr), 0);

        ledger.mint(addr, 100);
        ledger.escrow(&addr, 75).unwrap();
        assert_eq!(ledger.balance(&addr), 25);
        assert_eq!(ledger.held(), 75);

        ledger.disburse(&addr, 50).unwrap();
        assert_eq!(ledger.balance(&addr), 75);
        assert_eq!(ledger.held(), 25);
    }

    #[test]
    fn test_escrow_insufficient_funds_changes_nothing() {
        let ledger = Ledger::new();
        let addr = [1u8; 32];
        ledger.mint(addr, 10);

        assert_eq!(
            ledger.escrow(&addr, 11),
            Err(TransferError::InsufficientFunds {
                required: 11,
                available: 10
            })
        );
        assert_eq!(ledger.balance(&addr), 10);
        assert_eq!(ledger.held(), 0);
    }

    #[test]
    fn test_disburse_cannot_exceed_custody() {
        let ledger = Ledger::new();
        assert!(matches!(
            ledger.disburse(&[2u8; 32], 1),
            Err(TransferError::InsufficientEscrow { .. })
        ));
    }

    #[test]
    fn test_zero_transfers_follow_policy() {
        let strict = Ledger::new();
        assert!(!strict.accepts_zero());
        assert_eq!(strict.escrow(&[1u8; 32], 0), Err(TransferError::ZeroTransfer));

        let lenient = Ledger::accepting_zero();
        assert!(lenient.accepts_zero());
        assert!(lenient.escrow(&[1u8; 32], 0).is_ok());
    }
}
