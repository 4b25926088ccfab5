//! Client SDK for bidding in sealed-bid second-price auctions.
//!
//! This crate provides a high-level API for:
//! - Preparing commitments and keeping the secrets needed to reveal them
//! - Replaying scripted auctions against an in-memory chain

pub mod bid;
pub mod chain;

pub use bid::{prepare_bid, BidBuilder, PreparedBid};
pub use chain::{MockChain, Script, ScriptStep};
