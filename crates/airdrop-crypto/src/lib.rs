//! # airdrop-crypto: Merkle Commitment
//!
//! Commits an ordered allocation list to a single 32-byte root and produces
//! and checks inclusion proofs against it.
//!
//! - **Hashing** (`hasher.rs`): leaf digests over the 48-byte allocation
//!   preimage and sorted-pair node digests, with Keccak-256 or SHA-256.
//! - **Tree** (`merkle.rs`): bottom-up construction with the odd-node carry
//!   rule, proof extraction, and position-agnostic verification.
//!
//! ## Crate Policy
//!
//! - Depends only on `airdrop-core` internally.
//! - Pure functions only. No I/O, no shared mutable state; batch proof
//!   generation is safe to parallelize across indices.
//! - No mocking of hashes in tests. Golden vectors pin exact roots.

pub mod hasher;
pub mod merkle;

pub use hasher::{leaf_digest, node_digest};
pub use merkle::{build_root, max_proof_len, prove, verify_proof, MerkleCommitment, MerkleProof};
