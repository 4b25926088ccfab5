//! Auction registry: owns every auction and is the entry point for all
//! operations.
//!
//! The auction map sits behind a read-write lock and each auction behind its
//! own mutex. An operation holds the auction mutex for its whole
//! check-and-mutate step, so operations on one auction are serialized while
//! different auctions proceed independently.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use vickrey_types::{Address, Amount, AuctionInfo, BidView, Commitment, Phase, Settlement};

use crate::clock::Clock;
use crate::error::AuctionError;
use crate::handlers::{self, CallContext, HandlerResult};
use crate::state::AuctionRecord;
use crate::vault::Vault;

type RecordHandle = Arc<Mutex<AuctionRecord>>;

/// Owner of all auctions and bids.
pub struct AuctionRegistry<C, V> {
    clock: C,
    vault: V,
    auctions: RwLock<BTreeMap<u64, RecordHandle>>,
}

impl<C: Clock, V: Vault> AuctionRegistry<C, V> {
    pub fn new(clock: C, vault: V) -> Self {
        Self {
            clock,
            vault,
            auctions: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    fn record(&self, auction_id: u64) -> HandlerResult<RecordHandle> {
        self.auctions
            .read()
            .get(&auction_id)
            .cloned()
            .ok_or(AuctionError::AuctionNotFound(auction_id))
    }

    fn with_record<T>(&self, auction_id: u64, f: impl FnOnce(&AuctionRecord) -> T) -> Option<T> {
        let handle = self.record(auction_id).ok()?;
        let record = handle.lock();
        Some(f(&record))
    }

    /// Create an auction under `auction_id`. Ids are never reused.
    pub fn create_auction(
        &self,
        ctx: &CallContext,
        auction_id: u64,
        bidding_duration: u64,
        reveal_duration: u64,
    ) -> HandlerResult<AuctionInfo> {
        let mut auctions = self.auctions.write();
        if auctions.contains_key(&auction_id) {
            return Err(AuctionError::AuctionAlreadyExists(auction_id));
        }

        let now = self.clock.now();
        let record = handlers::handle_create_auction(
            ctx,
            now,
            auction_id,
            bidding_duration,
            reveal_duration,
        )?;
        let info = record.info();
        auctions.insert(auction_id, Arc::new(Mutex::new(record)));

        info!(
            auction_id,
            bidding_deadline = info.bidding_deadline,
            reveal_deadline = info.reveal_deadline,
            "Created auction"
        );
        Ok(info)
    }

    /// Commit to a sealed bid, escrowing `ctx.value` as the deposit.
    pub fn set_bid(
        &self,
        ctx: &CallContext,
        auction_id: u64,
        commitment: Commitment,
    ) -> HandlerResult<()> {
        let handle = self.record(auction_id)?;
        let mut record = handle.lock();
        let now = self.clock.now();

        handlers::check_set_bid(&record, ctx, now, self.vault.accepts_zero())?;
        self.vault.escrow(&ctx.sender, ctx.value)?;
        handlers::apply_set_bid(&mut record, ctx, commitment);

        debug!(auction_id, deposit = %ctx.value, "Bid committed");
        Ok(())
    }

    /// Open a previously committed bid.
    pub fn reveal_bid(
        &self,
        ctx: &CallContext,
        auction_id: u64,
        value: Amount,
        secret: &[u8],
    ) -> HandlerResult<()> {
        let handle = self.record(auction_id)?;
        let mut record = handle.lock();
        let now = self.clock.now();

        handlers::handle_reveal_bid(&mut record, ctx, now, value, secret)?;

        debug!(
            auction_id,
            value = %value,
            highest_bid = %record.highest_bid,
            second_highest_bid = %record.second_highest_bid,
            "Bid revealed"
        );
        Ok(())
    }

    /// Settle the caller's bid after the auction ended.
    ///
    /// The bid is marked refunded and the auction lock released before the
    /// payout, so a recipient re-entering this call observes the refunded
    /// flag. A failed payout restores the flag.
    pub fn refund_bid(&self, ctx: &CallContext, auction_id: u64) -> HandlerResult<Settlement> {
        let handle = self.record(auction_id)?;
        let now = self.clock.now();

        let settlement = {
            let mut record = handle.lock();
            handlers::handle_refund_bid(&mut record, ctx, now)?
        };

        if settlement.refund > 0 {
            if let Err(err) = self.vault.disburse(&ctx.sender, settlement.refund) {
                warn!(auction_id, error = %err, "Refund payout failed, rolling back");
                let mut record = handle.lock();
                handlers::rollback_refund(&mut record, &ctx.sender, &settlement);
                return Err(err.into());
            }
        }

        info!(
            auction_id,
            refund = %settlement.refund,
            payable = %settlement.payable,
            "Bid refunded"
        );
        Ok(settlement)
    }

    /// Phase of an auction right now.
    pub fn current_phase(&self, auction_id: u64) -> Option<Phase> {
        let now = self.clock.now();
        self.with_record(auction_id, |record| record.phase(now))
    }

    /// Revealed value of `bidder`'s bid, or 0 if none.
    pub fn get_bids(&self, bidder: &Address, auction_id: u64) -> Amount {
        self.with_record(auction_id, |record| {
            record
                .bids
                .get(bidder)
                .and_then(|bid| bid.revealed_value)
                .unwrap_or(0)
        })
        .unwrap_or(0)
    }

    /// Current holder of the highest revealed bid.
    pub fn get_winner(&self, auction_id: u64) -> Option<Address> {
        self.with_record(auction_id, |record| record.winner).flatten()
    }

    pub fn get_auction_info_by_id(&self, auction_id: u64) -> Option<AuctionInfo> {
        self.with_record(auction_id, AuctionRecord::info)
    }

    pub fn get_bid(&self, bidder: &Address, auction_id: u64) -> Option<BidView> {
        self.with_record(auction_id, |record| record.bid_view(bidder))
            .flatten()
    }

    /// All bids of an auction in commit order.
    pub fn list_bids(&self, auction_id: u64) -> Vec<BidView> {
        self.with_record(auction_id, AuctionRecord::bid_views)
            .unwrap_or_default()
    }

    /// Value the auction still holds in custody.
    pub fn escrowed(&self, auction_id: u64) -> Amount {
        self.with_record(auction_id, |record| record.escrowed)
            .unwrap_or(0)
    }

    /// Revealed values in reveal order.
    pub fn revealed_bids(&self, auction_id: u64) -> Vec<(Address, Amount)> {
        self.with_record(auction_id, AuctionRecord::revealed_bids)
            .unwrap_or_default()
    }

    pub fn auction_ids(&self) -> Vec<u64> {
        self.auctions.read().keys().copied().collect()
    }

    /// Clone of the full record, for audits and tooling.
    pub fn snapshot(&self, auction_id: u64) -> Option<AuctionRecord> {
        self.with_record(auction_id, AuctionRecord::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::vault::{Ledger, TransferError};
    use vickrey_crypto::compute_commitment;

    const ALICE: Address = [1u8; 32];
    const BOB: Address = [2u8; 32];

    fn setup() -> AuctionRegistry<ManualClock, Ledger> {
        let ledger = Ledger::new();
        ledger.mint(ALICE, 100);
        ledger.mint(BOB, 100);
        AuctionRegistry::new(ManualClock::new(0), ledger)
    }

    #[test]
    fn test_create_auction_once() {
        let registry = setup();
        let ctx = CallContext::new(ALICE);

        let info = registry.create_auction(&ctx, 7, 20, 30).unwrap();
        assert_eq!(info.bidding_deadline, 20);
        assert_eq!(
            registry.create_auction(&ctx, 7, 5, 6),
            Err(AuctionError::AuctionAlreadyExists(7))
        );
        assert_eq!(registry.auction_ids(), vec![7]);
    }

    #[test]
    fn test_invalid_duration_creates_nothing() {
        let registry = setup();
        assert!(registry
            .create_auction(&CallContext::new(ALICE), 1, 30, 30)
            .is_err());
        assert!(registry.auction_ids().is_empty());
    }

    #[test]
    fn test_unknown_auction() {
        let registry = setup();
        let ctx = CallContext::with_value(ALICE, 10);

        assert_eq!(
            registry.set_bid(&ctx, 9, Commitment([0u8; 32])),
            Err(AuctionError::AuctionNotFound(9))
        );
        assert_eq!(registry.get_bids(&ALICE, 9), 0);
        assert_eq!(registry.get_winner(9), None);
        assert_eq!(registry.get_auction_info_by_id(9), None);
        assert_eq!(registry.current_phase(9), None);
    }

    #[test]
    fn test_set_bid_escrows_deposit() {
        let registry = setup();
        registry.create_auction(&CallContext::new(ALICE), 0, 20, 30).unwrap();

        let ctx = CallContext::with_value(BOB, 40);
        registry.set_bid(&ctx, 0, compute_commitment(30, b"dog")).unwrap();

        assert_eq!(registry.vault().balance(&BOB), 60);
        assert_eq!(registry.escrowed(0), 40);
        assert_eq!(registry.get_bid(&BOB, 0).unwrap().deposit, 40);
    }

    #[test]
    fn test_failed_escrow_leaves_no_bid() {
        let registry = setup();
        registry.create_auction(&CallContext::new(ALICE), 0, 20, 30).unwrap();

        let ctx = CallContext::with_value(BOB, 101);
        assert_eq!(
            registry.set_bid(&ctx, 0, compute_commitment(1, b"x")),
            Err(AuctionError::Transfer(TransferError::InsufficientFunds {
                required: 101,
                available: 100
            }))
        );
        assert!(registry.get_bid(&BOB, 0).is_none());
        assert_eq!(registry.escrowed(0), 0);

        // the bidder may still commit with a smaller deposit
        let ctx = CallContext::with_value(BOB, 100);
        assert!(registry.set_bid(&ctx, 0, compute_commitment(1, b"x")).is_ok());
    }

    #[test]
    fn test_full_lifecycle() {
        let registry = setup();
        registry.create_auction(&CallContext::new(ALICE), 0, 20, 30).unwrap();
        assert_eq!(registry.current_phase(0), Some(Phase::Bidding));

        registry
            .set_bid(&CallContext::with_value(ALICE, 50), 0, compute_commitment(40, b"a"))
            .unwrap();
        registry
            .set_bid(&CallContext::with_value(BOB, 30), 0, compute_commitment(25, b"b"))
            .unwrap();

        registry.clock().set(20);
        assert_eq!(registry.current_phase(0), Some(Phase::Reveal));
        registry.reveal_bid(&CallContext::new(ALICE), 0, 40, b"a").unwrap();
        registry.reveal_bid(&CallContext::new(BOB), 0, 25, b"b").unwrap();
        assert_eq!(registry.get_winner(0), Some(ALICE));
        assert_eq!(registry.get_bids(&BOB, 0), 25);
        assert_eq!(registry.revealed_bids(0), vec![(ALICE, 40), (BOB, 25)]);

        registry.clock().set(30);
        let alice = registry.refund_bid(&CallContext::new(ALICE), 0).unwrap();
        let bob = registry.refund_bid(&CallContext::new(BOB), 0).unwrap();

        assert_eq!(alice, Settlement { refund: 25, payable: 25 });
        assert_eq!(bob, Settlement { refund: 30, payable: 0 });
        assert_eq!(registry.vault().balance(&ALICE), 75);
        assert_eq!(registry.vault().balance(&BOB), 100);
        assert_eq!(registry.escrowed(0), 25);
        assert_eq!(registry.vault().held(), 25);

        assert_eq!(
            registry.refund_bid(&CallContext::new(BOB), 0),
            Err(AuctionError::AlreadyRefunded)
        );
        assert_eq!(registry.vault().balance(&BOB), 100);
    }

    struct FailingVault;

    impl Vault for FailingVault {
        fn escrow(&self, _from: &Address, _amount: Amount) -> Result<(), TransferError> {
            Ok(())
        }

        fn disburse(&self, _to: &Address, _amount: Amount) -> Result<(), TransferError> {
            Err(TransferError::Rejected("recipient refused".into()))
        }
    }

    #[test]
    fn test_failed_payout_rolls_back_refund() {
        let registry = AuctionRegistry::new(ManualClock::new(0), FailingVault);
        registry.create_auction(&CallContext::new(ALICE), 0, 20, 30).unwrap();
        registry
            .set_bid(&CallContext::with_value(BOB, 10), 0, compute_commitment(5, b"s"))
            .unwrap();

        registry.clock().set(30);
        assert!(matches!(
            registry.refund_bid(&CallContext::new(BOB), 0),
            Err(AuctionError::Transfer(TransferError::Rejected(_)))
        ));

        let bid = registry.get_bid(&BOB, 0).unwrap();
        assert!(!bid.refunded);
        assert_eq!(registry.escrowed(0), 10);
    }
}
