//! In-memory chain for replaying scripted auctions.
//!
//! A script is a list of calls, each stamped with the time it is executed
//! at. The chain moves its clock to that time, runs the call and records the
//! outcome, so whole lifecycles can be exercised deterministically without
//! waiting on the wall clock.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;
use tracing::{info, warn};

use vickrey_module::queries::{get_auction_summaries, AuctionSummary};
use vickrey_module::{
    AuctionCall, AuctionRegistry, CallContext, CallOutcome, Clock, GenesisConfig,
    GenesisValidationError, Ledger, ManualClock,
};
use vickrey_types::{format_address, parse_address, Amount, ParseHexError};

/// Errors that abort a replay.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Invalid genesis: {0}")]
    Genesis(#[from] GenesisValidationError),

    #[error("Step {index}: invalid sender: {source}")]
    InvalidSender { index: usize, source: ParseHexError },

    #[error("Step {index}: time {at} is before current time {now}")]
    TimeWentBackwards { index: usize, at: u64, now: u64 },
}

/// A scripted auction run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

/// One call in a script.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Time the call executes at
    pub at: u64,
    /// Hex address of the caller
    pub sender: String,
    /// Value attached to the call
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub value: Amount,
    pub call: AuctionCall,
}

/// Result of one executed step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub at: u64,
    pub sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CallOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Account balance entry of a summary.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub address: String,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: Amount,
}

/// State of the chain after a replay.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSummary {
    pub timestamp: u64,
    pub auctions: Vec<AuctionSummary>,
    pub balances: Vec<BalanceEntry>,
    #[serde_as(as = "DisplayFromStr")]
    pub held: Amount,
}

/// In-memory chain state.
pub struct MockChain {
    registry: AuctionRegistry<ManualClock, Ledger>,
}

impl MockChain {
    pub fn from_genesis(genesis: &GenesisConfig) -> Result<Self, ChainError> {
        Ok(Self {
            registry: genesis.build_registry()?,
        })
    }

    pub fn registry(&self) -> &AuctionRegistry<ManualClock, Ledger> {
        &self.registry
    }

    /// Execute one step. Call failures are reported, not raised.
    pub fn apply(&self, index: usize, step: &ScriptStep) -> Result<StepReport, ChainError> {
        let sender = parse_address(&step.sender)
            .map_err(|source| ChainError::InvalidSender { index, source })?;

        let clock = self.registry.clock();
        if !clock.set(step.at) {
            return Err(ChainError::TimeWentBackwards {
                index,
                at: step.at,
                now: clock.now(),
            });
        }

        let ctx = CallContext::with_value(sender, step.value);
        let (outcome, error) = match self.registry.dispatch(&ctx, step.call.clone()) {
            Ok(outcome) => {
                info!(index, at = step.at, sender = %step.sender, ?outcome, "Step applied");
                (Some(outcome), None)
            }
            Err(err) => {
                warn!(index, at = step.at, sender = %step.sender, error = %err, "Step failed");
                (None, Some(err.to_string()))
            }
        };

        Ok(StepReport {
            index,
            at: step.at,
            sender: format_address(&sender),
            outcome,
            error,
        })
    }

    /// Execute every step of a script in order.
    pub fn run(&self, script: &Script) -> Result<Vec<StepReport>, ChainError> {
        script
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.apply(index, step))
            .collect()
    }

    pub fn summary(&self) -> ChainSummary {
        let ledger = self.registry.vault();
        ChainSummary {
            timestamp: self.registry.clock().now(),
            auctions: get_auction_summaries(&self.registry),
            balances: ledger
                .balances()
                .into_iter()
                .map(|(address, balance)| BalanceEntry {
                    address: format_address(&address),
                    balance,
                })
                .collect(),
            held: ledger.held(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vickrey_crypto::compute_commitment;
    use vickrey_module::AccountConfig;

    fn genesis() -> GenesisConfig {
        GenesisConfig {
            initial_timestamp: 0,
            accept_zero_deposits: false,
            accounts: vec![AccountConfig {
                address: parse_address("0x01").unwrap(),
                balance: 100,
            }],
        }
    }

    fn step(at: u64, value: Amount, call: AuctionCall) -> ScriptStep {
        ScriptStep {
            at,
            sender: "0x01".into(),
            value,
            call,
        }
    }

    #[test]
    fn test_replay_reports_failures_and_continues() {
        let chain = MockChain::from_genesis(&genesis()).unwrap();
        let script = Script {
            steps: vec![
                step(
                    0,
                    0,
                    AuctionCall::CreateAuction {
                        auction_id: 0,
                        bidding_duration: 5,
                        reveal_duration: 6,
                    },
                ),
                step(
                    6,
                    10,
                    AuctionCall::SetBid {
                        auction_id: 0,
                        commitment: compute_commitment(10, b"cat"),
                    },
                ),
            ],
        };

        let reports = chain.run(&script).unwrap();
        assert!(reports[0].outcome.is_some());
        assert_eq!(reports[1].error.as_deref(), Some("Auction is ended"));

        let summary = chain.summary();
        assert_eq!(summary.timestamp, 6);
        assert_eq!(summary.held, 0);
        assert_eq!(summary.balances[0].balance, 100);
    }

    #[test]
    fn test_time_cannot_go_backwards() {
        let chain = MockChain::from_genesis(&genesis()).unwrap();
        let refund = AuctionCall::RefundBid { auction_id: 0 };

        chain.apply(0, &step(10, 0, refund.clone())).unwrap();
        assert!(matches!(
            chain.apply(1, &step(9, 0, refund)),
            Err(ChainError::TimeWentBackwards { at: 9, now: 10, .. })
        ));
    }

    #[test]
    fn test_invalid_sender() {
        let chain = MockChain::from_genesis(&genesis()).unwrap();
        let mut bad = step(0, 0, AuctionCall::RefundBid { auction_id: 0 });
        bad.sender = "0xnothex".into();

        assert!(matches!(
            chain.apply(0, &bad),
            Err(ChainError::InvalidSender { index: 0, .. })
        ));
    }

    #[test]
    fn test_script_json() {
        let commitment = serde_json::to_value(compute_commitment(30, b"dog")).unwrap();
        let script: Script = serde_json::from_value(serde_json::json!({
            "steps": [
                { "at": 0, "sender": "0x01", "call": { "create_auction": {
                    "auction_id": 0, "bidding_duration": 20, "reveal_duration": 30 } } },
                { "at": 1, "sender": "0x01", "value": "40", "call": { "set_bid": {
                    "auction_id": 0, "commitment": commitment } } }
            ]
        }))
        .unwrap();

        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].value, 0);
        assert_eq!(script.steps[1].value, 40);
    }
}
