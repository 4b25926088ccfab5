//! Commit-reveal primitives for sealed-bid auctions.
//!
//! A bidder binds a value to a secret off-engine:
//!
//! ```text
//! commitment = keccak256(decimal(value) || ", " || secret)
//! ```
//!
//! and publishes only the 32-byte commitment. During the reveal phase the
//! bidder discloses `(value, secret)` and the engine recomputes the hash.
//! Keccak-256 makes it infeasible to find a second pair that reproduces the
//! same commitment, so the bidder cannot change the value after seeing
//! other commitments.

pub mod commitment;
pub mod error;

pub use commitment::{compute_commitment, generate_secret, keccak256, verify_commitment};
pub use error::CryptoError;
