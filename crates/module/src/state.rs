//! Per-auction state owned by the registry.

use std::collections::HashMap;

use vickrey_types::{Address, Amount, AuctionInfo, BidView, Commitment, Phase};

use crate::phase::resolve_phase;

/// A committed bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    /// Set once at commit time
    pub commitment: Commitment,
    /// Escrowed at commit time
    pub deposit: Amount,
    /// Set once by a successful reveal
    pub revealed_value: Option<Amount>,
    /// Set once by a successful refund
    pub refunded: bool,
}

/// State of a single auction.
#[derive(Debug, Clone)]
pub struct AuctionRecord {
    pub auction_id: u64,
    pub creator: Address,
    pub created_at: u64,

    // Timing
    pub bidding_deadline: u64,
    pub reveal_deadline: u64,

    // Order statistics over revealed values; 0 means "no bid"
    pub highest_bid: Amount,
    pub second_highest_bid: Amount,
    pub winner: Option<Address>,

    /// Bids by bidder
    pub bids: HashMap<Address, Bid>,
    /// Bidders in commit order
    pub bidders: Vec<Address>,
    /// Bidders in reveal order
    pub reveals: Vec<Address>,

    /// Deposits taken minus refunds paid
    pub escrowed: Amount,
}

impl AuctionRecord {
    pub fn new(
        auction_id: u64,
        creator: Address,
        created_at: u64,
        bidding_deadline: u64,
        reveal_deadline: u64,
    ) -> Self {
        Self {
            auction_id,
            creator,
            created_at,
            bidding_deadline,
            reveal_deadline,
            highest_bid: 0,
            second_highest_bid: 0,
            winner: None,
            bids: HashMap::new(),
            bidders: Vec::new(),
            reveals: Vec::new(),
            escrowed: 0,
        }
    }

    pub fn phase(&self, now: u64) -> Phase {
        resolve_phase(self.bidding_deadline, self.reveal_deadline, now)
    }

    pub fn info(&self) -> AuctionInfo {
        AuctionInfo {
            bidding_deadline: self.bidding_deadline,
            reveal_deadline: self.reveal_deadline,
            highest_bid: self.highest_bid,
            second_highest_bid: self.second_highest_bid,
            winner: self.winner,
        }
    }

    pub fn bid_view(&self, bidder: &Address) -> Option<BidView> {
        self.bids.get(bidder).map(|bid| BidView {
            bidder: *bidder,
            commitment: bid.commitment,
            deposit: bid.deposit,
            revealed_value: bid.revealed_value,
            refunded: bid.refunded,
        })
    }

    /// Revealed values in reveal order.
    pub fn revealed_bids(&self) -> Vec<(Address, Amount)> {
        self.reveals
            .iter()
            .filter_map(|bidder| {
                self.bids
                    .get(bidder)
                    .and_then(|bid| bid.revealed_value)
                    .map(|value| (*bidder, value))
            })
            .collect()
    }

    /// All bids in commit order.
    pub fn bid_views(&self) -> Vec<BidView> {
        self.bidders
            .iter()
            .filter_map(|bidder| self.bid_view(bidder))
            .collect()
    }
}
