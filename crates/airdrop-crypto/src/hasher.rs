//! # Leaf and Node Hashing
//!
//! - Leaf: `H(index_LE(8) || recipient(32) || amount_LE(8))`.
//! - Node: `H(min(a, b) || max(a, b))`, children ordered by unsigned byte
//!   value so that a verifier never needs to know which side a sibling
//!   was on.
//!
//! `H` is selected by [`HashAlgorithm`]. The preimage layouts are identical
//! for both algorithms.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

use airdrop_core::{Allocation, HashAlgorithm, MerkleDigest, DIGEST_LEN};

/// Hash the concatenation of `parts` with digest `D`.
fn digest_parts<D: Digest>(parts: &[&[u8]]) -> MerkleDigest {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    let out = hasher.finalize();
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&out);
    MerkleDigest::new(bytes)
}

/// Hash the concatenation of `parts` with the given algorithm.
pub fn hash_parts(algorithm: HashAlgorithm, parts: &[&[u8]]) -> MerkleDigest {
    match algorithm {
        HashAlgorithm::Keccak256 => digest_parts::<Keccak256>(parts),
        HashAlgorithm::Sha256 => digest_parts::<Sha256>(parts),
    }
}

/// Compute the leaf digest of one allocation.
pub fn leaf_digest(algorithm: HashAlgorithm, allocation: &Allocation) -> MerkleDigest {
    hash_parts(algorithm, &[&allocation.leaf_preimage()])
}

/// Order two siblings by unsigned byte value, smaller first.
pub fn canonical_order(a: MerkleDigest, b: MerkleDigest) -> (MerkleDigest, MerkleDigest) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Combine two children into their parent, independent of argument order.
pub fn node_digest(algorithm: HashAlgorithm, a: &MerkleDigest, b: &MerkleDigest) -> MerkleDigest {
    let (lo, hi) = canonical_order(*a, *b);
    hash_parts(algorithm, &[lo.as_bytes(), hi.as_bytes()])
}
