//! Phase resolution from deadlines and current time.

use vickrey_types::Phase;

use crate::error::AuctionError;

/// Resolve the phase of an auction at `now`.
///
/// `Bidding` while `now < bidding_deadline`, `Reveal` while
/// `now < reveal_deadline`, `Ended` from `reveal_deadline` on.
pub fn resolve_phase(bidding_deadline: u64, reveal_deadline: u64, now: u64) -> Phase {
    if now < bidding_deadline {
        Phase::Bidding
    } else if now < reveal_deadline {
        Phase::Reveal
    } else {
        Phase::Ended
    }
}

/// Require `actual == expected`, otherwise report the phase the auction is in.
pub fn require_phase(actual: Phase, expected: Phase) -> Result<(), AuctionError> {
    if actual == expected {
        return Ok(());
    }
    Err(match actual {
        Phase::Bidding => AuctionError::AuctionIsOnBiddingPhase,
        Phase::Reveal => AuctionError::AuctionIsOnRevealPhase,
        Phase::Ended => AuctionError::AuctionIsEnded,
    })
}
