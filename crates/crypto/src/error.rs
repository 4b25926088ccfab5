//! Error types for commitment handling.

use thiserror::Error;
use vickrey_types::ParseHexError;

/// Errors that can occur while handling commitments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Invalid commitment encoding: {0}")]
    InvalidCommitment(#[from] ParseHexError),

    #[error("Secret must not be empty")]
    EmptySecret,
}
