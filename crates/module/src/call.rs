//! Call message types for the auction engine.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use vickrey_types::{Amount, AuctionInfo, Commitment, Settlement};

use crate::clock::Clock;
use crate::handlers::{CallContext, HandlerResult};
use crate::registry::AuctionRegistry;
use crate::vault::Vault;

/// State-changing calls.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionCall {
    /// Create a new auction. Durations count from the creation instant.
    CreateAuction {
        auction_id: u64,
        bidding_duration: u64,
        reveal_duration: u64,
    },

    /// Commit to a sealed bid. The attached value is the deposit.
    SetBid {
        auction_id: u64,
        commitment: Commitment,
    },

    /// Reveal a committed bid.
    RevealBid {
        auction_id: u64,
        #[serde_as(as = "DisplayFromStr")]
        value: Amount,
        secret: String,
    },

    /// Claim the refund after the auction ended.
    RefundBid { auction_id: u64 },
}

impl AuctionCall {
    pub fn auction_id(&self) -> u64 {
        match self {
            AuctionCall::CreateAuction { auction_id, .. }
            | AuctionCall::SetBid { auction_id, .. }
            | AuctionCall::RevealBid { auction_id, .. }
            | AuctionCall::RefundBid { auction_id } => *auction_id,
        }
    }
}

/// Result of a successful call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Created(AuctionInfo),
    Committed,
    Revealed,
    Refunded(Settlement),
}

impl<C: Clock, V: Vault> AuctionRegistry<C, V> {
    /// Route a call to the matching operation.
    pub fn dispatch(&self, ctx: &CallContext, call: AuctionCall) -> HandlerResult<CallOutcome> {
        match call {
            AuctionCall::CreateAuction {
                auction_id,
                bidding_duration,
                reveal_duration,
            } => self
                .create_auction(ctx, auction_id, bidding_duration, reveal_duration)
                .map(CallOutcome::Created),
            AuctionCall::SetBid {
                auction_id,
                commitment,
            } => self
                .set_bid(ctx, auction_id, commitment)
                .map(|()| CallOutcome::Committed),
            AuctionCall::RevealBid {
                auction_id,
                value,
                secret,
            } => self
                .reveal_bid(ctx, auction_id, value, secret.as_bytes())
                .map(|()| CallOutcome::Revealed),
            AuctionCall::RefundBid { auction_id } => self
                .refund_bid(ctx, auction_id)
                .map(CallOutcome::Refunded),
        }
    }
}
