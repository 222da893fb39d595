//! # Verification Data
//!
//! The byte payload a claimant submits with a redemption:
//!
//! ```text
//! index_LE(8) || sibling_0(32) || sibling_1(32) || ... || sibling_k-1(32)
//! ```
//!
//! The first 8 bytes double as the index component of the claim-record key.

use crate::digest::{MerkleDigest, DIGEST_LEN};
use crate::error::ParseError;

const INDEX_LEN: usize = 8;

/// Decoded redemption payload: the claimed index and its sibling path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationData {
    /// Position of the claimed allocation.
    pub index: u64,
    /// Sibling digests, leaf to root.
    pub proof: Vec<MerkleDigest>,
}

impl VerificationData {
    /// Create a payload from an index and its proof.
    pub fn new(index: u64, proof: Vec<MerkleDigest>) -> Self {
        Self { index, proof }
    }

    /// Encode to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(INDEX_LEN + self.proof.len() * DIGEST_LEN);
        out.extend_from_slice(&self.index.to_le_bytes());
        for sibling in &self.proof {
            out.extend_from_slice(sibling.as_bytes());
        }
        out
    }

    /// Decode from the wire layout.
    ///
    /// # Errors
    ///
    /// Rejects payloads shorter than 8 bytes or whose proof section is not a
    /// whole number of 32-byte digests.
    pub fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() < INDEX_LEN || (bytes.len() - INDEX_LEN) % DIGEST_LEN != 0 {
            let siblings = bytes.len().saturating_sub(INDEX_LEN) / DIGEST_LEN;
            return Err(ParseError::InvalidLength {
                what: "verification data",
                expected: INDEX_LEN + siblings * DIGEST_LEN,
                actual: bytes.len(),
            });
        }
        let (index_bytes, rest) = bytes.split_at(INDEX_LEN);
        let mut index = [0u8; INDEX_LEN];
        index.copy_from_slice(index_bytes);
        let proof = rest
            .chunks_exact(DIGEST_LEN)
            .map(MerkleDigest::from_slice)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            index: u64::from_le_bytes(index),
            proof,
        })
    }
}
