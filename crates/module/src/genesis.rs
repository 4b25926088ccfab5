//! Genesis configuration for an engine instance.
//!
//! Defines the initial time, the zero-deposit policy of the value-transfer
//! layer and the funded accounts an in-memory deployment starts with.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};
use vickrey_types::{Address, Amount};

use crate::clock::ManualClock;
use crate::registry::AuctionRegistry;
use crate::vault::Ledger;

/// Genesis configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Time the clock starts at
    #[serde(default)]
    pub initial_timestamp: u64,

    /// Whether zero-value deposits are accepted
    #[serde(default)]
    pub accept_zero_deposits: bool,

    /// Accounts funded at genesis
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// A funded account.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde_as(as = "Hex")]
    pub address: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: Amount,
}

impl GenesisConfig {
    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        let mut seen = HashSet::new();
        for account in &self.accounts {
            if !seen.insert(account.address) {
                return Err(GenesisValidationError::DuplicateAccount(hex::encode(
                    account.address,
                )));
            }
        }

        let total = self
            .accounts
            .iter()
            .try_fold(0u128, |acc, account| acc.checked_add(account.balance));
        if total.is_none() {
            return Err(GenesisValidationError::SupplyOverflow);
        }

        Ok(())
    }

    /// Funded ledger for this genesis.
    pub fn build_ledger(&self) -> Ledger {
        let ledger = if self.accept_zero_deposits {
            Ledger::accepting_zero()
        } else {
            Ledger::new()
        };
        for account in &self.accounts {
            ledger.mint(account.address, account.balance);
        }
        ledger
    }

    /// Validate and build a registry on a manual clock.
    pub fn build_registry(
        &self,
    ) -> Result<AuctionRegistry<ManualClock, Ledger>, GenesisValidationError> {
        self.validate()?;
        Ok(AuctionRegistry::new(
            ManualClock::new(self.initial_timestamp),
            self.build_ledger(),
        ))
    }
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("Duplicate account: {0}")]
    DuplicateAccount(String),

    #[error("Total supply overflows")]
    SupplyOverflow,
}
