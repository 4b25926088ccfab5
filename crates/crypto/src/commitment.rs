//! Keccak-256 commitments over a bid value and a secret.

use rand::{CryptoRng, RngCore};
use tiny_keccak::{Hasher, Keccak};

use vickrey_types::{Amount, Commitment};

const SEPARATOR: &[u8] = b", ";

/// Compute keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Bind `value` and `secret` into a commitment.
///
/// The pre-image is the decimal rendering of `value` in base units, the
/// separator `", "`, then the raw secret bytes.
pub fn compute_commitment(value: Amount, secret: &[u8]) -> Commitment {
    let mut hasher = Keccak::v256();
    hasher.update(value.to_string().as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(secret);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    Commitment(out)
}

/// Check that `(value, secret)` opens `commitment`.
pub fn verify_commitment(commitment: &Commitment, value: Amount, secret: &[u8]) -> bool {
    compute_commitment(value, secret) == *commitment
}

/// Generate a fresh hex secret with 256 bits of entropy.
pub fn generate_secret<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_keccak256_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_commitment_matches_preimage_layout() {
        let commitment = compute_commitment(10, b"cat");
        assert_eq!(commitment.0, keccak256(b"10, cat"));
        assert_eq!(
            commitment.to_string(),
            "0xe805fc1cf6730d8c462ac149387b31f3473358900ba8ee16ef80eb99ee3e9b9c"
        );
    }

    #[test]
    fn test_commitment_opens_only_with_committed_pair() {
        let commitment = compute_commitment(1_540_000, b"dog");

        assert!(verify_commitment(&commitment, 1_540_000, b"dog"));
        assert!(!verify_commitment(&commitment, 1_540_001, b"dog"));
        assert!(!verify_commitment(&commitment, 1_540_000, b"cat"));
    }

    #[test]
    fn test_separator_prevents_trivial_shift() {
        // "1" + "2x" and "12" + "x" must not collide
        assert_ne!(compute_commitment(1, b"2x"), compute_commitment(12, b"x"));
    }

    #[test]
    fn test_generate_secret_is_random_hex() {
        let mut rng = OsRng;
        let a = generate_secret(&mut rng);
        let b = generate_secret(&mut rng);

        assert_eq!(a.len(), 64);
        assert!(hex::decode(&a).is_ok());
        assert_ne!(a, b);
    }
}
