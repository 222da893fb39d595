//! # airdrop-core: Foundational Types for the Merkle Airdrop
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `AccountId` and `AssetId` are
//!    distinct 32-byte types. An asset identifier cannot be passed where a
//!    claimant is expected.
//!
//! 2. **One leaf preimage.** [`Allocation::leaf_preimage()`] is the only
//!    place the 48-byte `index || recipient || amount` layout is produced.
//!    Every leaf digest flows through it.
//!
//! 3. **Algorithm-tagged digests.** Every published root travels with the
//!    [`HashAlgorithm`] that produced it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `airdrop-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod allocation;
pub mod digest;
pub mod error;
pub mod identity;
pub mod verification;

pub use allocation::{
    allocations_from_entries, find_by_recipient, format_amount, parse_amount, Allocation,
    AllocationEntry, LEAF_PREIMAGE_LEN,
};
pub use digest::{HashAlgorithm, MerkleDigest, DIGEST_LEN};
pub use error::{AirdropError, CommitmentError, LedgerError, ParseError, StoreError};
pub use identity::{AccountId, AssetId};
pub use verification::VerificationData;
