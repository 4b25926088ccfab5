//! Business logic for each auction operation.
//!
//! Handlers operate on a single [`AuctionRecord`] that the caller already
//! holds exclusively. A handler either returns `Ok` with every mutation
//! applied or `Err` with the record untouched. Value transfer is left to the
//! registry.

use vickrey_crypto::verify_commitment;
use vickrey_types::{Address, Amount, Commitment, Phase, Settlement};

use crate::error::AuctionError;
use crate::phase::require_phase;
use crate::state::{AuctionRecord, Bid};

/// Context provided for each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Caller of the operation
    pub sender: Address,
    /// Value attached to the call (the deposit for a commit)
    pub value: Amount,
}

impl CallContext {
    pub fn new(sender: Address) -> Self {
        Self { sender, value: 0 }
    }

    pub fn with_value(sender: Address, value: Amount) -> Self {
        Self { sender, value }
    }
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, AuctionError>;

/// Build a new auction record.
///
/// Both durations count from `now`; `reveal_duration` is the total time to
/// the end of the auction, not an increment past the bidding deadline.
pub fn handle_create_auction(
    ctx: &CallContext,
    now: u64,
    auction_id: u64,
    bidding_duration: u64,
    reveal_duration: u64,
) -> HandlerResult<AuctionRecord> {
    let invalid = AuctionError::InvalidDuration {
        bidding: bidding_duration,
        reveal: reveal_duration,
    };
    if reveal_duration <= bidding_duration {
        return Err(invalid);
    }
    let bidding_deadline = now.checked_add(bidding_duration).ok_or(invalid.clone())?;
    let reveal_deadline = now.checked_add(reveal_duration).ok_or(invalid)?;

    Ok(AuctionRecord::new(
        auction_id,
        ctx.sender,
        now,
        bidding_deadline,
        reveal_deadline,
    ))
}

/// Validate a commit without touching the record.
pub fn check_set_bid(
    record: &AuctionRecord,
    ctx: &CallContext,
    now: u64,
    accepts_zero: bool,
) -> HandlerResult<()> {
    require_phase(record.phase(now), Phase::Bidding)?;

    if record.bids.contains_key(&ctx.sender) {
        return Err(AuctionError::DuplicateBid);
    }

    if ctx.value == 0 && !accepts_zero {
        return Err(AuctionError::InvalidDeposit);
    }

    Ok(())
}

/// Store a commit that passed [`check_set_bid`] and whose deposit is escrowed.
pub fn apply_set_bid(record: &mut AuctionRecord, ctx: &CallContext, commitment: Commitment) {
    record.bids.insert(
        ctx.sender,
        Bid {
            commitment,
            deposit: ctx.value,
            revealed_value: None,
            refunded: false,
        },
    );
    record.bidders.push(ctx.sender);
    record.escrowed += ctx.value;
}

/// Handle a reveal.
pub fn handle_reveal_bid(
    record: &mut AuctionRecord,
    ctx: &CallContext,
    now: u64,
    value: Amount,
    secret: &[u8],
) -> HandlerResult<()> {
    require_phase(record.phase(now), Phase::Reveal)?;

    let bid = record
        .bids
        .get_mut(&ctx.sender)
        .ok_or(AuctionError::NoSuchBid)?;

    if bid.revealed_value.is_some() {
        return Err(AuctionError::AlreadyRevealed);
    }

    if !verify_commitment(&bid.commitment, value, secret) {
        return Err(AuctionError::CommitmentMismatch);
    }

    if value > bid.deposit {
        return Err(AuctionError::InsufficientDeposit {
            deposit: bid.deposit,
            value,
        });
    }

    bid.revealed_value = Some(value);
    record.reveals.push(ctx.sender);
    update_order_statistics(record, ctx.sender, value);

    Ok(())
}

/// Fold a revealed value into the running order statistics.
///
/// Strict comparisons: an equal later reveal never displaces the current
/// winner, it only raises the second price to the tied value.
pub fn update_order_statistics(record: &mut AuctionRecord, bidder: Address, value: Amount) {
    if value > record.highest_bid {
        record.second_highest_bid = record.highest_bid;
        record.highest_bid = value;
        record.winner = Some(bidder);
    } else if value > record.second_highest_bid {
        record.second_highest_bid = value;
    }
}

/// Split a bid's deposit into refund and retained proceeds.
pub fn compute_settlement(record: &AuctionRecord, bidder: &Address, bid: &Bid) -> Settlement {
    if record.winner.as_ref() == Some(bidder) {
        Settlement {
            refund: bid.deposit - record.second_highest_bid,
            payable: record.second_highest_bid,
        }
    } else {
        Settlement {
            refund: bid.deposit,
            payable: 0,
        }
    }
}

/// Handle a refund: mark the bid refunded and book the payout.
///
/// The caller must pay out `settlement.refund` afterwards, and call
/// [`rollback_refund`] if that payout fails.
pub fn handle_refund_bid(
    record: &mut AuctionRecord,
    ctx: &CallContext,
    now: u64,
) -> HandlerResult<Settlement> {
    require_phase(record.phase(now), Phase::Ended)?;

    let bid = record.bids.get(&ctx.sender).ok_or(AuctionError::NoSuchBid)?;
    if bid.refunded {
        return Err(AuctionError::AlreadyRefunded);
    }

    let settlement = compute_settlement(record, &ctx.sender, bid);

    if let Some(bid) = record.bids.get_mut(&ctx.sender) {
        bid.refunded = true;
    }
    record.escrowed -= settlement.refund;

    Ok(settlement)
}

/// Undo [`handle_refund_bid`] after a failed payout.
pub fn rollback_refund(record: &mut AuctionRecord, bidder: &Address, settlement: &Settlement) {
    if let Some(bid) = record.bids.get_mut(bidder) {
        bid.refunded = false;
        record.escrowed += settlement.refund;
    }
}
