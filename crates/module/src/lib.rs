//! Sealed-bid second-price ("Vickrey") auction engine with commit-reveal
//! bidding.
//!
//! Bidders commit to a hash of their bid and a secret while the auction is
//! in its bidding phase, open it during the reveal phase, and claim their
//! refund once the auction ended. The highest revealer wins and pays the
//! second-highest revealed value.
//!
//! # Architecture
//!
//! - `clock`: injected time source
//! - `vault`: injected value-transfer capability and an in-memory ledger
//! - `phase`: phase resolution from deadlines
//! - `state`: per-auction records
//! - `handlers`: business logic for each operation
//! - `registry`: ownership, locking and value transfer orchestration
//! - `call` / `queries`: message-style entry points
//! - `audit`: offline verification of settlement numbers
//! - `genesis`: initial configuration
//! - `error`: error types
//!
//! # Example
//!
//! ```ignore
//! use vickrey_module::{AuctionRegistry, CallContext, Ledger, ManualClock};
//!
//! let registry = AuctionRegistry::new(ManualClock::new(0), Ledger::new());
//! registry.create_auction(&CallContext::new(creator), 0, 20, 30)?;
//! registry.set_bid(&CallContext::with_value(bidder, deposit), 0, commitment)?;
//! ```

pub mod audit;
pub mod call;
pub mod clock;
pub mod error;
pub mod genesis;
pub mod handlers;
pub mod phase;
pub mod queries;
pub mod registry;
pub mod state;
pub mod vault;

pub use audit::{AuctionOutcome, AuditError};
pub use call::{AuctionCall, CallOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuctionError, ErrorKind};
pub use genesis::{AccountConfig, GenesisConfig, GenesisValidationError};
pub use handlers::{CallContext, HandlerResult};
pub use phase::resolve_phase;
pub use queries::{AuctionQuery, AuctionQueryResponse};
pub use registry::AuctionRegistry;
pub use vault::{Ledger, TransferError, Vault};
