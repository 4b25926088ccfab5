//! Bid preparation.

use rand::{CryptoRng, RngCore};
use thiserror::Error;

use vickrey_crypto::{compute_commitment, generate_secret, CryptoError};
use vickrey_module::AuctionCall;
use vickrey_types::{Amount, Commitment};

/// Errors that can occur during bid preparation.
#[derive(Debug, Error)]
pub enum BidError {
    #[error("Deposit {deposit} does not cover bid {value}")]
    DepositBelowValue { value: Amount, deposit: Amount },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// A prepared bid ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedBid {
    /// Commitment to publish during bidding
    pub commitment: Commitment,
    /// Secret (keep private until the reveal phase)
    pub secret: String,
    /// Bid value (keep private until the reveal phase)
    pub value: Amount,
    /// Deposit to attach to the commit
    pub deposit: Amount,
}

impl PreparedBid {
    /// Commit call and the value to attach to it.
    pub fn commit_call(&self, auction_id: u64) -> (AuctionCall, Amount) {
        (
            AuctionCall::SetBid {
                auction_id,
                commitment: self.commitment,
            },
            self.deposit,
        )
    }

    /// Reveal call opening the commitment.
    pub fn reveal_call(&self, auction_id: u64) -> AuctionCall {
        AuctionCall::RevealBid {
            auction_id,
            value: self.value,
            secret: self.secret.clone(),
        }
    }
}

/// Prepare a bid with a freshly generated secret.
///
/// The deposit may exceed the value to hide it; it must never be lower,
/// or the reveal will be rejected.
pub fn prepare_bid<R: RngCore + CryptoRng>(
    value: Amount,
    deposit: Amount,
    rng: &mut R,
) -> Result<PreparedBid, BidError> {
    prepare_bid_with_secret(value, deposit, generate_secret(rng))
}

/// Prepare a bid with a caller-chosen secret.
pub fn prepare_bid_with_secret(
    value: Amount,
    deposit: Amount,
    secret: String,
) -> Result<PreparedBid, BidError> {
    if secret.is_empty() {
        return Err(CryptoError::EmptySecret.into());
    }
    if deposit < value {
        return Err(BidError::DepositBelowValue { value, deposit });
    }

    Ok(PreparedBid {
        commitment: compute_commitment(value, secret.as_bytes()),
        secret,
        value,
        deposit,
    })
}

/// Builder for preparing bids.
pub struct BidBuilder {
    value: Amount,
    deposit: Option<Amount>,
    secret: Option<String>,
}

impl BidBuilder {
    pub fn new(value: Amount) -> Self {
        Self {
            value,
            deposit: None,
            secret: None,
        }
    }

    /// Deposit to attach; defaults to the bid value.
    pub fn deposit(mut self, deposit: Amount) -> Self {
        self.deposit = Some(deposit);
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Build the prepared bid.
    pub fn build<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<PreparedBid, BidError> {
        let deposit = self.deposit.unwrap_or(self.value);
        match self.secret {
            Some(secret) => prepare_bid_with_secret(self.value, deposit, secret),
            None => prepare_bid(self.value, deposit, rng),
        }
    }
}
