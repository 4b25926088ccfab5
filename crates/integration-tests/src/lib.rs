//! End-to-end integration tests for the sealed-bid auction engine.
//!
//! These tests exercise the full auction lifecycle:
//! 1. Auction creation
//! 2. Commitment and escrow of deposits
//! 3. Reveal and order-statistic maintenance
//! 4. Settlement and refunds
//!
//! Time is driven by a `ManualClock`, so every phase boundary is hit exactly.

#[cfg(test)]
mod helpers {
    use vickrey_module::{AuctionRegistry, Ledger, ManualClock};
    use vickrey_types::{Address, Amount, UNITS_PER_ETHER};

    pub const DEPLOYER: Address = [0xde; 32];

    pub fn bidder(n: u8) -> Address {
        [n; 32]
    }

    /// Parse a decimal ether amount such as "1.54" into base units.
    pub fn ether(s: &str) -> Amount {
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let whole: Amount = whole.parse().unwrap();
        let mut frac = frac.to_string();
        frac.extend(std::iter::repeat('0').take(18 - frac.len()));
        whole * UNITS_PER_ETHER + frac.parse::<Amount>().unwrap()
    }

    /// Registry at t=0 with every bidder funded with 100 ether.
    pub fn registry(bidders: &[Address]) -> AuctionRegistry<ManualClock, Ledger> {
        let ledger = Ledger::new();
        for b in bidders {
            ledger.mint(*b, ether("100"));
        }
        AuctionRegistry::new(ManualClock::new(0), ledger)
    }
}



#[cfg(test)]
mod concurrency {
    use std::thread;

    use super::helpers::*;
    use vickrey_crypto::compute_commitment;
    use vickrey_module::{AuctionError, CallContext};

    #[test]
    fn test_parallel_duplicate_commits_escrow_once() {
        let x = bidder(1);
        let registry = registry(&[x]);
        registry
            .create_auction(&CallContext::new(DEPLOYER), 0, 10, 20)
            .unwrap();

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let registry = &registry;
                    s.spawn(move || {
                        registry.set_bid(
                            &CallContext::with_value(x, ether("1")),
                            0,
                            compute_commitment(i, b"race"),
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == AuctionError::DuplicateBid));
        assert_eq!(registry.vault().balance(&x), ether("99"));
        assert_eq!(registry.escrowed(0), ether("1"));
    }

    #[test]
    fn test_parallel_auctions_are_independent() {
        let bidders: Vec<_> = (1..=6).map(bidder).collect();
        let registry = registry(&bidders);
        for id in 0..3 {
            registry
                .create_auction(&CallContext::new(DEPLOYER), id, 10, 20)
                .unwrap();
        }

        thread::scope(|s| {
            for (i, b) in bidders.iter().enumerate() {
                let registry = &registry;
                s.spawn(move || {
                    registry
                        .set_bid(
                            &CallContext::with_value(*b, ether("2")),
                            (i % 3) as u64,
                            compute_commitment(ether("1"), b"s"),
                        )
                        .unwrap();
                });
            }
        });

        for id in 0..3 {
            assert_eq!(registry.escrowed(id), ether("4"));
        }
        assert_eq!(registry.vault().held(), ether("12"));
    }
}
