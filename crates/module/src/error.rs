//! Auction engine error types.

use thiserror::Error;
use vickrey_types::Amount;

use crate::vault::TransferError;

/// Errors that can occur in the auction engine.
///
/// Every error aborts the triggering operation and leaves the auction
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Auction not found: {0}")]
    AuctionNotFound(u64),

    // Phase violations
    #[error("Auction is on bidding phase")]
    AuctionIsOnBiddingPhase,

    #[error("Auction is on reveal phase")]
    AuctionIsOnRevealPhase,

    #[error("Auction is ended")]
    AuctionIsEnded,

    // Conflicts
    #[error("Auction already exists: {0}")]
    AuctionAlreadyExists(u64),

    #[error("Bidder already committed to this auction")]
    DuplicateBid,

    #[error("Bid already revealed")]
    AlreadyRevealed,

    #[error("Bid already refunded")]
    AlreadyRefunded,

    // Validation
    #[error("Invalid duration: reveal {reveal} must exceed bidding {bidding}")]
    InvalidDuration { bidding: u64, reveal: u64 },

    #[error("Invalid deposit")]
    InvalidDeposit,

    #[error("Commitment mismatch")]
    CommitmentMismatch,

    #[error("Insufficient deposit: value {value} exceeds deposit {deposit}")]
    InsufficientDeposit { deposit: Amount, value: Amount },

    #[error("No bid for this bidder")]
    NoSuchBid,

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Coarse classification of [`AuctionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PhaseViolation,
    Conflict,
    Validation,
    NotFound,
    Transfer,
}

impl AuctionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuctionError::AuctionIsOnBiddingPhase
            | AuctionError::AuctionIsOnRevealPhase
            | AuctionError::AuctionIsEnded => ErrorKind::PhaseViolation,
            AuctionError::AuctionAlreadyExists(_)
            | AuctionError::DuplicateBid
            | AuctionError::AlreadyRevealed
            | AuctionError::AlreadyRefunded => ErrorKind::Conflict,
            AuctionError::InvalidDuration { .. }
            | AuctionError::InvalidDeposit
            | AuctionError::CommitmentMismatch
            | AuctionError::InsufficientDeposit { .. }
            | AuctionError::NoSuchBid => ErrorKind::Validation,
            AuctionError::AuctionNotFound(_) => ErrorKind::NotFound,
            AuctionError::Transfer(_) => ErrorKind::Transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AuctionError::AuctionIsEnded.kind(), ErrorKind::PhaseViolation);
        assert_eq!(AuctionError::DuplicateBid.kind(), ErrorKind::Conflict);
        assert_eq!(AuctionError::NoSuchBid.kind(), ErrorKind::Validation);
        assert_eq!(AuctionError::AuctionNotFound(3).kind(), ErrorKind::NotFound);
        assert_eq!(
            AuctionError::from(TransferError::ZeroTransfer).kind(),
            ErrorKind::Transfer
        );
    }

    #[test]
    fn test_messages_are_payload_light() {
        assert_eq!(
            AuctionError::InvalidDuration { bidding: 20, reveal: 10 }.to_string(),
            "Invalid duration: reveal 10 must exceed bidding 20"
        );
    }
}
