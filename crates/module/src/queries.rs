//! Query handlers for the auction engine.
//!
//! These functions provide read-only access to auction state and never fail;
//! unknown auctions and bidders yield sentinels.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};
use vickrey_types::{Address, Amount, AuctionInfo, BidView, Phase};

use crate::clock::Clock;
use crate::registry::AuctionRegistry;
use crate::vault::Vault;

/// Query request types.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionQuery {
    /// Revealed value of a bidder's bid (0 if none).
    GetBids {
        #[serde_as(as = "Hex")]
        bidder: Address,
        auction_id: u64,
    },

    /// Current winner.
    GetWinner { auction_id: u64 },

    /// Deadlines and order statistics.
    GetAuctionInfo { auction_id: u64 },

    /// Phase at the current time.
    GetPhase { auction_id: u64 },

    /// Full bid record of a bidder.
    GetBid {
        #[serde_as(as = "Hex")]
        bidder: Address,
        auction_id: u64,
    },

    /// Value still in custody for an auction.
    GetEscrowed { auction_id: u64 },

    /// Revealed values in reveal order.
    GetRevealedBids { auction_id: u64 },

    /// Ids of all auctions.
    ListAuctions,
}

/// Query response types.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionQueryResponse {
    Bids(#[serde_as(as = "DisplayFromStr")] Amount),
    Winner(#[serde_as(as = "Option<Hex>")] Option<Address>),
    AuctionInfo(Option<AuctionInfo>),
    Phase(Option<Phase>),
    Bid(Option<BidView>),
    Escrowed(#[serde_as(as = "DisplayFromStr")] Amount),
    RevealedBids(#[serde_as(as = "Vec<(Hex, DisplayFromStr)>")] Vec<(Address, Amount)>),
    AuctionList(Vec<u64>),
}

/// Handle a query.
pub fn handle_query<C: Clock, V: Vault>(
    registry: &AuctionRegistry<C, V>,
    query: AuctionQuery,
) -> AuctionQueryResponse {
    match query {
        AuctionQuery::GetBids { bidder, auction_id } => {
            AuctionQueryResponse::Bids(registry.get_bids(&bidder, auction_id))
        }

        AuctionQuery::GetWinner { auction_id } => {
            AuctionQueryResponse::Winner(registry.get_winner(auction_id))
        }

        AuctionQuery::GetAuctionInfo { auction_id } => {
            AuctionQueryResponse::AuctionInfo(registry.get_auction_info_by_id(auction_id))
        }

        AuctionQuery::GetPhase { auction_id } => {
            AuctionQueryResponse::Phase(registry.current_phase(auction_id))
        }

        AuctionQuery::GetBid { bidder, auction_id } => {
            AuctionQueryResponse::Bid(registry.get_bid(&bidder, auction_id))
        }

        AuctionQuery::GetEscrowed { auction_id } => {
            AuctionQueryResponse::Escrowed(registry.escrowed(auction_id))
        }

        AuctionQuery::GetRevealedBids { auction_id } => {
            AuctionQueryResponse::RevealedBids(registry.revealed_bids(auction_id))
        }

        AuctionQuery::ListAuctions => AuctionQueryResponse::AuctionList(registry.auction_ids()),
    }
}

/// Summary of an auction for listing.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionSummary {
    pub auction_id: u64,
    #[serde_as(as = "Hex")]
    pub creator: Address,
    pub phase: Phase,
    pub info: AuctionInfo,
    pub num_bids: usize,
    pub num_reveals: usize,
    #[serde_as(as = "DisplayFromStr")]
    pub escrowed: Amount,
}

/// Summaries of every auction at the current time.
pub fn get_auction_summaries<C: Clock, V: Vault>(
    registry: &AuctionRegistry<C, V>,
) -> Vec<AuctionSummary> {
    let now = registry.clock().now();
    registry
        .auction_ids()
        .into_iter()
        .filter_map(|auction_id| registry.snapshot(auction_id))
        .map(|record| AuctionSummary {
            auction_id: record.auction_id,
            creator: record.creator,
            phase: record.phase(now),
            info: record.info(),
            num_bids: record.bidders.len(),
            num_reveals: record.reveals.len(),
            escrowed: record.escrowed,
        })
        .collect()
}
