//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout the airdrop workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Commitment errors describe a malformed allocation list or proof request.
//! - Ledger errors are the claim taxonomy: every variant is a definitive
//!   answer about whether a state transition is valid. Only
//!   [`LedgerError::Store`] describes a transient condition.
//! - Nothing in the core retries. Callers decide.

use thiserror::Error;

use crate::digest::MerkleDigest;
use crate::identity::{AccountId, AssetId};

/// Top-level error type for the airdrop workspace.
#[derive(Error, Debug)]
pub enum AirdropError {
    /// Parsing an identifier, digest or encoded payload failed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Building a commitment or a proof failed.
    #[error("commitment error: {0}")]
    Commitment(#[from] CommitmentError),

    /// A ledger transition was rejected.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AirdropError {
    /// Whether this is a definitive answer about the request itself.
    ///
    /// Malformed payloads and rejected claims are; store failures and
    /// unknown airdrops describe the environment instead.
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Parse(_) | Self::Commitment(_) => true,
            Self::Ledger(e) => !matches!(
                e,
                LedgerError::Store(_) | LedgerError::UnknownAirdrop { .. }
            ),
        }
    }
}

/// Error while decoding textual or binary representations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input is not valid base58.
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// Input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length does not match the expected width.
    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// What was being decoded.
        what: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Amount is not an unsigned 64-bit integer.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Hash algorithm name is not recognised.
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Error while building a Merkle commitment or extracting a proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitmentError {
    /// A commitment needs at least one allocation.
    #[error("allocation list is empty")]
    EmptyAllocationList,

    /// Allocation indices must be dense, 0-based and equal to their position.
    #[error("allocation at position {position} carries index {index}")]
    NonCanonicalIndex {
        /// Position in the ordered list.
        position: u64,
        /// Index stored in the allocation.
        index: u64,
    },

    /// Requested index is not in the list.
    #[error("index {index} out of range for {count} allocations")]
    IndexOutOfRange {
        /// Requested index.
        index: u64,
        /// Number of allocations.
        count: u64,
    },
}

/// Error from the persistence layer backing the ledger.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored record is unreadable.
    #[error("corrupt record at {location}: {reason}")]
    Corrupt {
        /// Where the record lives (path or key).
        location: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Claim-ledger error taxonomy.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Index is not below the allocation count of the airdrop.
    #[error("index {index} out of range for {count} allocations")]
    IndexOutOfRange {
        /// Requested index.
        index: u64,
        /// Number of allocations committed to by the root.
        count: u64,
    },

    /// The recomputed root does not match the committed root.
    #[error("proof for index {index} does not match the committed root")]
    ProofInvalid {
        /// Index the proof was submitted for.
        index: u64,
    },

    /// A claim record already exists for the index.
    #[error("allocation {index} has already been claimed")]
    AlreadyClaimed {
        /// The claimed index.
        index: u64,
    },

    /// A state already exists for this (asset, root) pair.
    #[error("airdrop for asset {asset} and root {root} is already initialized")]
    AlreadyInitialized {
        /// Funding asset.
        asset: AssetId,
        /// Published root.
        root: MerkleDigest,
    },

    /// Caller is not the authority of the airdrop.
    #[error("{caller} is not the airdrop authority")]
    NotAuthorized {
        /// The rejected caller.
        caller: AccountId,
    },

    /// No state exists for this (asset, root) pair.
    #[error("no airdrop for asset {asset} and root {root}")]
    UnknownAirdrop {
        /// Funding asset.
        asset: AssetId,
        /// Published root.
        root: MerkleDigest,
    },

    /// Persistence failure. The attempted transition was not applied.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::ProofInvalid { .. } => "proof_invalid",
            Self::AlreadyClaimed { .. } => "already_claimed",
            Self::AlreadyInitialized { .. } => "already_initialized",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::UnknownAirdrop { .. } => "unknown_airdrop",
            Self::Store(_) => "store",
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Only persistence failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
