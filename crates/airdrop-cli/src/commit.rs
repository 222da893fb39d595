//! # Build Subcommand
//!
//! Reads the allocation source (a JSON array of `{account, amount}`),
//! builds the commitment and writes a commitment file holding the root,
//! the algorithm and every allocation with its proof. This file is what
//! gets distributed to claimants and what `init`, `prove` and `claim` read.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use airdrop_core::{
    allocations_from_entries, find_by_recipient, AccountId, Allocation, AllocationEntry,
    HashAlgorithm, MerkleDigest,
};
use airdrop_crypto::{leaf_digest, verify_proof, MerkleCommitment, MerkleProof};

use crate::config::CliConfig;

/// Arguments for `airdrop build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Allocation source: JSON array of `{ "account": <base58>, "amount": <u64> }`.
    #[arg(long, value_name = "FILE")]
    pub allocations: PathBuf,

    /// Where to write the commitment file.
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,

    /// Hash function. Overrides the configured default.
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,
}

/// One allocation with its inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedAllocation {
    /// Position in the ordered list.
    pub index: u64,
    /// Recipient account.
    pub recipient: AccountId,
    /// Base-unit amount.
    pub amount: u64,
    /// Sibling digests, leaf to root.
    pub proof: MerkleProof,
}

impl CommittedAllocation {
    /// The allocation without its proof.
    pub fn allocation(&self) -> Allocation {
        Allocation::new(self.index, self.recipient, self.amount)
    }
}

/// The published commitment and everything needed to claim against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentFile {
    /// Merkle root.
    pub root: MerkleDigest,
    /// Hash function the root was built with.
    pub hash_algorithm: HashAlgorithm,
    /// Number of allocations.
    pub allocation_count: u64,
    /// Every allocation, in index order.
    pub allocations: Vec<CommittedAllocation>,
}

impl CommitmentFile {
    /// Build from an ordered allocation list.
    pub fn build(allocations: &[Allocation], algorithm: HashAlgorithm) -> Result<Self> {
        let tree = MerkleCommitment::build(allocations, algorithm)?;
        let allocations = allocations
            .iter()
            .zip(tree.prove_all())
            .map(|(a, proof)| CommittedAllocation {
                index: a.index,
                recipient: a.recipient,
                amount: a.amount,
                proof,
            })
            .collect();
        Ok(Self {
            root: tree.root(),
            hash_algorithm: algorithm,
            allocation_count: tree.leaf_count(),
            allocations,
        })
    }

    /// Read a commitment file and check that its allocation list is well
    /// formed.
    ///
    /// The declared root is trusted as published. Individual entries are
    /// checked against it with [`CommitmentFile::entry_verifies`] when used.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read commitment: {}", path.display()))?;
        let file: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse commitment: {}", path.display()))?;
        file.check_layout()
            .with_context(|| format!("malformed commitment: {}", path.display()))?;
        Ok(file)
    }

    fn check_layout(&self) -> Result<()> {
        if self.allocations.len() as u64 != self.allocation_count {
            bail!(
                "declares {} allocations but lists {}",
                self.allocation_count,
                self.allocations.len()
            );
        }
        if let Some((pos, entry)) = self
            .allocations
            .iter()
            .enumerate()
            .find(|(pos, entry)| entry.index != *pos as u64)
        {
            bail!("entry at position {pos} is numbered {}", entry.index);
        }
        Ok(())
    }

    /// Whether `entry`'s proof leads to the declared root.
    pub fn entry_verifies(&self, entry: &CommittedAllocation) -> bool {
        let leaf = leaf_digest(self.hash_algorithm, &entry.allocation());
        verify_proof(
            self.hash_algorithm,
            &self.root,
            &leaf,
            entry.index,
            entry.proof.siblings(),
        )
    }

    /// Entry at `index`.
    pub fn get(&self, index: u64) -> Option<&CommittedAllocation> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.allocations.get(i))
    }

    /// First entry for `recipient`.
    pub fn find(&self, recipient: &AccountId) -> Option<&CommittedAllocation> {
        let list: Vec<Allocation> = self.allocations.iter().map(|a| a.allocation()).collect();
        find_by_recipient(&list, recipient).and_then(|a| self.get(a.index))
    }
}

/// Read the allocation source.
pub fn read_allocations(path: &Path) -> Result<Vec<Allocation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read allocations: {}", path.display()))?;
    let entries: Vec<AllocationEntry> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse allocations: {}", path.display()))?;
    Ok(allocations_from_entries(&entries))
}

/// Write `bytes` to `path` through a temp file and rename, so readers never
/// see a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Execute `airdrop build`.
pub fn run_build(args: &BuildArgs, config: &CliConfig) -> Result<u8> {
    let algorithm = args.algorithm.unwrap_or(config.hash_algorithm);
    let allocations = read_allocations(&args.allocations)?;
    let file = CommitmentFile::build(&allocations, algorithm)?;
    let json = serde_json::to_vec_pretty(&file)?;
    write_atomic(&args.out, &json)?;

    tracing::info!(
        root = %file.root,
        allocations = file.allocation_count,
        algorithm = %algorithm,
        out = %args.out.display(),
        "commitment written"
    );
    println!("root: {}", file.root);
    println!("algorithm: {algorithm}");
    println!("allocations: {}", file.allocation_count);
    Ok(0)
}
