//! # Airdrop State and Claim Records
//!
//! ## States
//!
//! ```text
//! airdrop:   Uninitialized → Active
//! claim[i]:  Unclaimed → Claimed        (terminal)
//! ```
//!
//! An [`AirdropState`] is created once by `initialize` and never mutated.
//! A [`ClaimRecord`] is created once by `redeem` and never mutated or
//! deleted. Both are keyed by [`AirdropKey`], the (asset, root) pair, so the
//! same asset can fund several airdrops with different roots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airdrop_core::{AccountId, AssetId, HashAlgorithm, MerkleDigest};

/// Which transfer program moves the funding asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStandard {
    /// The original token program.
    #[default]
    Classic,
    /// The extended token program.
    Token2022,
}

impl std::fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Classic => "classic",
            Self::Token2022 => "token_2022",
        })
    }
}

/// Identifies one airdrop: the funding asset and the published root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AirdropKey {
    /// Funding asset.
    pub asset: AssetId,
    /// Published Merkle root.
    pub root: MerkleDigest,
}

impl AirdropKey {
    /// Create a key.
    pub fn new(asset: AssetId, root: MerkleDigest) -> Self {
        Self { asset, root }
    }

    /// Filesystem-safe name, `<asset base58>-<root hex>`.
    pub fn storage_name(&self) -> String {
        format!("{}-{}", self.asset.to_base58(), self.root.to_hex())
    }
}

impl std::fmt::Display for AirdropKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.asset, self.root)
    }
}

/// Per-airdrop configuration. Immutable once initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropState {
    /// Account allowed to withdraw the residual pool.
    pub authority: AccountId,
    /// Funding asset.
    pub asset: AssetId,
    /// Root of the allocation commitment.
    pub root: MerkleDigest,
    /// Transfer program for the funding asset.
    #[serde(default)]
    pub token_standard: TokenStandard,
    /// Number of allocations committed to by `root`.
    pub allocation_count: u64,
    /// Hash function the root was built with.
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

impl AirdropState {
    /// A classic-token, Keccak-256 airdrop.
    pub fn new(
        authority: AccountId,
        asset: AssetId,
        root: MerkleDigest,
        allocation_count: u64,
    ) -> Self {
        Self {
            authority,
            asset,
            root,
            token_standard: TokenStandard::default(),
            allocation_count,
            hash_algorithm: HashAlgorithm::default(),
        }
    }

    /// Set the token standard.
    pub fn with_token_standard(mut self, token_standard: TokenStandard) -> Self {
        self.token_standard = token_standard;
        self
    }

    /// Set the hash algorithm.
    pub fn with_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = hash_algorithm;
        self
    }

    /// The (asset, root) key of this airdrop.
    pub fn key(&self) -> AirdropKey {
        AirdropKey::new(self.asset, self.root)
    }
}

/// Durable marker of a completed redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// The airdrop this claim belongs to.
    pub airdrop: AirdropKey,
    /// Redeemed allocation index.
    pub index: u64,
    /// Account that redeemed it.
    pub recipient: AccountId,
    /// Amount authorized for transfer.
    pub amount: u64,
    /// When the record was created.
    pub claimed_at: DateTime<Utc>,
}

/// Redemption status of one allocation index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimStatus {
    /// No record exists.
    Unclaimed,
    /// A record exists.
    Claimed(ClaimRecord),
}

impl ClaimStatus {
    /// Whether the index has been redeemed.
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed(_))
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unclaimed => "UNCLAIMED",
            Self::Claimed(_) => "CLAIMED",
        })
    }
}
