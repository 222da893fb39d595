//! # Merkle Commitment
//!
//! A binary hash tree over the leaf digests of an ordered allocation list.
//!
//! ## Algorithm
//!
//! Levels are built bottom-up. Adjacent pairs `(2j, 2j+1)` are combined with
//! [`node_digest`], which sorts the two children by byte value before
//! hashing. When a level has an odd number of nodes the last one is carried
//! up unchanged, not re-hashed and not paired with itself.
//!
//! ```text
//!            root
//!          /      \
//!       n01        L2      <- L2 carried, no sibling at this level
//!      /   \        |
//!    L0     L1     L2
//! ```
//!
//! A proof lists one sibling per level at which the node had one, leaf to
//! root. Carried levels contribute nothing, so proofs may be shorter than
//! `ceil(log2(N))` but never longer.
//!
//! ## Security Invariant
//!
//! The sorted-pair combination and the carry rule must be reproduced bit for
//! bit. Any deviation yields a different root that cannot be told apart from
//! a correct one except by comparing against a reference root; the golden
//! vectors below pin both.

use serde::{Deserialize, Serialize};

use airdrop_core::{Allocation, CommitmentError, HashAlgorithm, MerkleDigest};

use crate::hasher::{leaf_digest, node_digest};

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

/// Ordered sibling digests from a leaf up to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerkleProof(Vec<MerkleDigest>);

impl MerkleProof {
    /// Wrap a sibling path.
    pub fn new(siblings: Vec<MerkleDigest>) -> Self {
        Self(siblings)
    }

    /// The sibling digests, leaf to root.
    pub fn siblings(&self) -> &[MerkleDigest] {
        &self.0
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the proof is empty (single-allocation trees).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap the sibling path.
    pub fn into_vec(self) -> Vec<MerkleDigest> {
        self.0
    }
}

impl From<Vec<MerkleDigest>> for MerkleProof {
    fn from(siblings: Vec<MerkleDigest>) -> Self {
        Self(siblings)
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify that `leaf` is committed to by `root` through `proof`.
///
/// The index argument names the allocation the leaf is claimed for. It
/// takes no part in recombination: the leaf preimage already embeds the
/// index, so a leaf cannot be replayed at another position.
///
/// Returns `true` only on exact 32-byte equality with `root`.
pub fn verify_proof(
    algorithm: HashAlgorithm,
    root: &MerkleDigest,
    leaf: &MerkleDigest,
    _index: u64,
    proof: &[MerkleDigest],
) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |current, sibling| node_digest(algorithm, &current, sibling));
    &computed == root
}

/// Upper bound on proof length for a list of `count` allocations:
/// `ceil(log2(count))`, and 0 for a single allocation.
pub fn max_proof_len(count: u64) -> usize {
    if count <= 1 {
        return 0;
    }
    (u64::BITS - (count - 1).leading_zeros()) as usize
}

// ---------------------------------------------------------------------------
// Tree construction
// ---------------------------------------------------------------------------

/// Check the build precondition: non-empty, indices dense and equal to
/// their position.
fn validate_allocations(allocations: &[Allocation]) -> Result<(), CommitmentError> {
    if allocations.is_empty() {
        return Err(CommitmentError::EmptyAllocationList);
    }
    for (position, allocation) in allocations.iter().enumerate() {
        if allocation.index != position as u64 {
            return Err(CommitmentError::NonCanonicalIndex {
                position: position as u64,
                index: allocation.index,
            });
        }
    }
    Ok(())
}

/// Combine one level into the next, carrying an unpaired last node.
fn next_layer(algorithm: HashAlgorithm, layer: &[MerkleDigest]) -> Vec<MerkleDigest> {
    layer
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => node_digest(algorithm, left, right),
            carried => carried[0],
        })
        .collect()
}

/// A fully materialized Merkle tree over an allocation list.
///
/// Holds every level so that proofs for many recipients can be extracted
/// without rebuilding. Immutable once built.
#[derive(Debug, Clone)]
pub struct MerkleCommitment {
    algorithm: HashAlgorithm,
    /// All levels bottom-up. `layers[0]` holds the leaf digests and the last
    /// level holds only the root.
    layers: Vec<Vec<MerkleDigest>>,
    root: MerkleDigest,
}

impl MerkleCommitment {
    /// Build the tree over an ordered allocation list.
    ///
    /// # Errors
    ///
    /// - [`CommitmentError::EmptyAllocationList`] for an empty list.
    /// - [`CommitmentError::NonCanonicalIndex`] if any allocation's index
    ///   differs from its position.
    pub fn build(
        allocations: &[Allocation],
        algorithm: HashAlgorithm,
    ) -> Result<Self, CommitmentError> {
        validate_allocations(allocations)?;
        let leaves = allocations
            .iter()
            .map(|a| leaf_digest(algorithm, a))
            .collect();
        Self::from_leaves(leaves, algorithm)
    }

    /// Build the tree over precomputed leaf digests.
    pub fn from_leaves(
        leaves: Vec<MerkleDigest>,
        algorithm: HashAlgorithm,
    ) -> Result<Self, CommitmentError> {
        let mut root = match leaves.as_slice() {
            [] => return Err(CommitmentError::EmptyAllocationList),
            [first, ..] => *first,
        };
        let mut layers = vec![leaves];
        while let Some(top) = layers.last() {
            if top.len() <= 1 {
                break;
            }
            let next = next_layer(algorithm, top);
            root = next[0];
            layers.push(next);
        }
        Ok(Self {
            algorithm,
            layers,
            root,
        })
    }

    /// The hash algorithm this tree was built with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The published root.
    pub fn root(&self) -> MerkleDigest {
        self.root
    }

    /// Number of committed allocations.
    pub fn leaf_count(&self) -> u64 {
        self.layers[0].len() as u64
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Leaf digest at `index`, if present.
    pub fn leaf(&self, index: u64) -> Option<MerkleDigest> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.layers[0].get(i).copied())
    }

    /// Extract the inclusion proof for `index`.
    ///
    /// # Errors
    ///
    /// [`CommitmentError::IndexOutOfRange`] if `index >= leaf_count()`.
    pub fn prove(&self, index: u64) -> Result<MerkleProof, CommitmentError> {
        let count = self.leaf_count();
        if index >= count {
            return Err(CommitmentError::IndexOutOfRange { index, count });
        }
        let mut pos = index as usize;
        let mut siblings = Vec::with_capacity(self.depth());
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = pos ^ 1;
            if let Some(digest) = layer.get(sibling) {
                siblings.push(*digest);
            }
            pos /= 2;
        }
        Ok(MerkleProof(siblings))
    }

    /// Extract proofs for every index, in index order.
    pub fn prove_all(&self) -> Vec<MerkleProof> {
        (0..self.leaf_count())
            .filter_map(|i| self.prove(i).ok())
            .collect()
    }

    /// Verify a proof against this tree's root.
    pub fn verify(&self, leaf: &MerkleDigest, index: u64, proof: &MerkleProof) -> bool {
        verify_proof(self.algorithm, &self.root, leaf, index, proof.siblings())
    }
}

/// Compute the root of an allocation list.
pub fn build_root(
    allocations: &[Allocation],
    algorithm: HashAlgorithm,
) -> Result<MerkleDigest, CommitmentError> {
    MerkleCommitment::build(allocations, algorithm).map(|c| c.root())
}

/// Compute the proof for `index` in an allocation list.
///
/// Rebuilds the tree; use [`MerkleCommitment::prove`] when extracting many
/// proofs from the same list.
pub fn prove(
    allocations: &[Allocation],
    index: u64,
    algorithm: HashAlgorithm,
) -> Result<MerkleProof, CommitmentError> {
    if index >= allocations.len() as u64 {
        return Err(CommitmentError::IndexOutOfRange {
            index,
            count: allocations.len() as u64,
        });
    }
    MerkleCommitment::build(allocations, algorithm)?.prove(index)
}
