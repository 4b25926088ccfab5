//! Core type definitions for sealed-bid second-price auctions.
//!
//! This crate provides the shared data structures used across the auction
//! engine, its clients and its tooling: identities, amounts, commitments,
//! the derived auction phase and the read-only snapshots handed out by the
//! registry.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};
use thiserror::Error;

// =========================
// PRIMITIVES
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Value in base units (1 ether = 10^18 units).
pub type Amount = u128;

/// Number of base units in one whole unit of value.
pub const UNITS_PER_ETHER: Amount = 1_000_000_000_000_000_000;

/// Errors produced when parsing hex-encoded identities and commitments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHexError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Parse a hex address, with or without `0x` prefix.
///
/// Shorter inputs are left-aligned into the 32-byte identity, so `0x01`
/// and `0x0100…00` denote the same bidder.
pub fn parse_address(s: &str) -> Result<Address, ParseHexError> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
    if bytes.len() > 32 {
        return Err(ParseHexError::InvalidLength {
            expected: 32,
            got: bytes.len(),
        });
    }
    let mut addr = [0u8; 32];
    addr[..bytes.len()].copy_from_slice(&bytes);
    Ok(addr)
}

/// Hex rendering of an address with `0x` prefix.
pub fn format_address(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr))
}

/// Opaque 32-byte binding of a bid value and a bidder-chosen secret.
///
/// The engine never interprets a commitment at commit time; it only compares
/// it against a recomputation during the reveal.
///
/// Serialized as a `0x`-prefixed hex string; the prefix is optional on input.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self)
    }
}

impl From<Commitment> for String {
    fn from(commitment: Commitment) -> Self {
        commitment.to_string()
    }
}

impl TryFrom<String> for Commitment {
    type Error = ParseHexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Commitment {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
        let len = bytes.len();
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| ParseHexError::InvalidLength {
            expected: 32,
            got: len,
        })?;
        Ok(Self(bytes))
    }
}

// =========================
// AUCTION TYPES
// =========================

/// Auction lifecycle phase.
///
/// Always derived from the deadlines and the current time, never stored.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
    Serialize, Deserialize,
)]
pub enum Phase {
    /// Accepting commitments
    Bidding,
    /// Accepting reveals
    Reveal,
    /// Accepting refunds
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Bidding => "bidding",
            Phase::Reveal => "reveal",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Immutable snapshot of an auction's public state.
///
/// `second_highest_bid` is exactly what the winner pays.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionInfo {
    pub bidding_deadline: u64,
    pub reveal_deadline: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub highest_bid: Amount,
    #[serde_as(as = "DisplayFromStr")]
    pub second_highest_bid: Amount,
    #[serde_as(as = "Option<Hex>")]
    pub winner: Option<Address>,
}

/// A committed bid as seen from outside the engine.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BidView {
    #[serde_as(as = "Hex")]
    pub bidder: Address,
    pub commitment: Commitment,
    #[serde_as(as = "DisplayFromStr")]
    pub deposit: Amount,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub revealed_value: Option<Amount>,
    pub refunded: bool,
}

/// Money movement of a single refund.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Settlement {
    /// Amount sent back to the bidder
    #[serde_as(as = "DisplayFromStr")]
    pub refund: Amount,
    /// Amount retained as auction proceeds
    #[serde_as(as = "DisplayFromStr")]
    pub payable: Amount,
}
