//! Offline settlement audit.
//!
//! Recomputes the outcome of an auction from its reveal sequence, without
//! the incremental bookkeeping the registry uses, and checks the registry's
//! numbers against it. External settlement checks use this to confirm the
//! winner pays exactly the second-highest revealed value.

use thiserror::Error;
use vickrey_types::{Address, Amount, AuctionInfo};

use crate::clock::Clock;
use crate::handlers::compute_settlement;
use crate::registry::AuctionRegistry;
use crate::vault::Vault;

/// Outcome of an auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionOutcome {
    pub winner: Option<Address>,
    pub highest_bid: Amount,
    pub second_highest_bid: Amount,
}

/// Discrepancies found by an audit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("Auction not found: {0}")]
    AuctionNotFound(u64),

    #[error("Winner mismatch")]
    WinnerMismatch,

    #[error("Highest bid mismatch: expected {expected}, recorded {recorded}")]
    HighestBidMismatch { expected: Amount, recorded: Amount },

    #[error("Second price mismatch: expected {expected}, recorded {recorded}")]
    SecondPriceMismatch { expected: Amount, recorded: Amount },

    #[error("Escrow mismatch: expected {expected}, recorded {recorded}")]
    EscrowMismatch { expected: Amount, recorded: Amount },
}

/// Compute the outcome of a second-price auction.
///
/// `reveals` must be in reveal order. Ties go to the earliest revealer and a
/// zero value never wins.
pub fn recompute_outcome(reveals: &[(Address, Amount)]) -> AuctionOutcome {
    // Stable sort keeps reveal order among equal values
    let mut sorted: Vec<_> = reveals.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let highest_bid = sorted.first().map(|(_, value)| *value).unwrap_or(0);
    let second_highest_bid = sorted.get(1).map(|(_, value)| *value).unwrap_or(0);
    let winner = sorted
        .first()
        .filter(|(_, value)| *value > 0)
        .map(|(bidder, _)| *bidder);

    AuctionOutcome {
        winner,
        highest_bid,
        second_highest_bid,
    }
}

/// Check a registry snapshot against the recomputed outcome.
pub fn verify_settlement(
    info: &AuctionInfo,
    reveals: &[(Address, Amount)],
) -> Result<AuctionOutcome, AuditError> {
    let outcome = recompute_outcome(reveals);

    if outcome.winner != info.winner {
        return Err(AuditError::WinnerMismatch);
    }
    if outcome.highest_bid != info.highest_bid {
        return Err(AuditError::HighestBidMismatch {
            expected: outcome.highest_bid,
            recorded: info.highest_bid,
        });
    }
    if outcome.second_highest_bid != info.second_highest_bid {
        return Err(AuditError::SecondPriceMismatch {
            expected: outcome.second_highest_bid,
            recorded: info.second_highest_bid,
        });
    }

    Ok(outcome)
}

impl<C: Clock, V: Vault> AuctionRegistry<C, V> {
    /// Audit an auction's order statistics and its custody balance.
    pub fn audit(&self, auction_id: u64) -> Result<AuctionOutcome, AuditError> {
        let record = self
            .snapshot(auction_id)
            .ok_or(AuditError::AuctionNotFound(auction_id))?;

        let outcome = verify_settlement(&record.info(), &record.revealed_bids())?;

        let expected: Amount = record
            .bids
            .iter()
            .map(|(bidder, bid)| {
                if bid.refunded {
                    compute_settlement(&record, bidder, bid).payable
                } else {
                    bid.deposit
                }
            })
            .sum();
        if expected != record.escrowed {
            return Err(AuditError::EscrowMismatch {
                expected,
                recorded: record.escrowed,
            });
        }

        Ok(outcome)
    }
}
