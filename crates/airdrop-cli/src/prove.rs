//! # Prove and Verify Subcommands
//!
//! `prove` looks up one allocation in a commitment file and prints it with
//! its proof, both as a hex list and as the encoded verification payload a
//! claim submits. `verify` checks a proof against a root with nothing but
//! the command-line arguments.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use airdrop_core::{
    format_amount, AccountId, Allocation, HashAlgorithm, MerkleDigest, VerificationData,
};
use airdrop_crypto::{leaf_digest, verify_proof};

use crate::commit::{CommitmentFile, CommittedAllocation};
use crate::config::CliConfig;

/// Arguments for `airdrop prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Commitment file written by `airdrop build`.
    #[arg(long, value_name = "FILE")]
    pub commitment: PathBuf,

    /// Allocation index.
    #[arg(long, conflicts_with = "recipient", required_unless_present = "recipient")]
    pub index: Option<u64>,

    /// Recipient account (base58). Uses the first allocation for it.
    #[arg(long)]
    pub recipient: Option<AccountId>,
}

/// Arguments for `airdrop verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Published root (hex).
    #[arg(long)]
    pub root: MerkleDigest,

    /// Allocation index.
    #[arg(long)]
    pub index: u64,

    /// Recipient account (base58).
    #[arg(long)]
    pub recipient: AccountId,

    /// Amount in base units.
    #[arg(long)]
    pub amount: u64,

    /// Sibling digests, comma separated, leaf to root. Omit for a single
    /// allocation.
    #[arg(long, value_delimiter = ',')]
    pub proof: Vec<MerkleDigest>,

    /// Hash function. Overrides the configured default.
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,
}

/// Resolve an allocation by index or recipient.
pub(crate) fn lookup<'a>(
    file: &'a CommitmentFile,
    index: Option<u64>,
    recipient: Option<&AccountId>,
) -> Option<&'a CommittedAllocation> {
    match (index, recipient) {
        (Some(i), Some(r)) => file.get(i).filter(|e| &e.recipient == r),
        (Some(i), None) => file.get(i),
        (None, Some(r)) => file.find(r),
        (None, None) => None,
    }
}

/// Execute `airdrop prove`.
pub fn run_prove(args: &ProveArgs, config: &CliConfig) -> Result<u8> {
    let file = CommitmentFile::load(&args.commitment)?;
    let Some(entry) = lookup(&file, args.index, args.recipient.as_ref()) else {
        println!("no allocation");
        return Ok(1);
    };
    if !file.entry_verifies(entry) {
        println!(
            "FAIL: proof for index {} does not lead to root {}",
            entry.index, file.root
        );
        return Ok(1);
    }

    let payload = VerificationData::new(entry.index, entry.proof.siblings().to_vec());
    println!("index: {}", entry.index);
    println!("recipient: {}", entry.recipient);
    println!(
        "amount: {} ({})",
        entry.amount,
        format_amount(entry.amount, config.decimals)
    );
    println!("root: {}", file.root);
    let proof: Vec<String> = entry.proof.siblings().iter().map(|d| d.to_hex()).collect();
    println!("proof: {}", proof.join(","));
    println!("verification_data: {}", hex::encode(payload.encode()));
    Ok(0)
}

/// Execute `airdrop verify`.
pub fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let algorithm = args.algorithm.unwrap_or(config.hash_algorithm);
    let leaf = leaf_digest(
        algorithm,
        &Allocation::new(args.index, args.recipient, args.amount),
    );
    if verify_proof(algorithm, &args.root, &leaf, args.index, &args.proof) {
        println!("VALID");
        Ok(0)
    } else {
        println!("INVALID");
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    fn file() -> CommitmentFile {
        let allocs = vec![
            Allocation::new(0, acct(1), 100),
            Allocation::new(1, acct(2), 200),
            Allocation::new(2, acct(3), 300),
        ];
        CommitmentFile::build(&allocs, HashAlgorithm::Keccak256).unwrap()
    }

    #[test]
    fn lookup_by_index_or_recipient() {
        let f = file();
        assert_eq!(lookup(&f, Some(1), None).unwrap().recipient, acct(2));
        assert_eq!(lookup(&f, None, Some(&acct(3))).unwrap().index, 2);
        assert!(lookup(&f, None, Some(&acct(9))).is_none());
        assert!(lookup(&f, Some(7), None).is_none());
        // Index and recipient must agree when both are given.
        assert!(lookup(&f, Some(0), Some(&acct(2))).is_none());
    }

    #[test]
    fn verify_accepts_committed_proof() {
        let f = file();
        let entry = f.get(2).unwrap();
        let args = VerifyArgs {
            root: f.root,
            index: 2,
            recipient: acct(3),
            amount: 300,
            proof: entry.proof.siblings().to_vec(),
            algorithm: None,
        };
        assert_eq!(run_verify(&args, &CliConfig::default()).unwrap(), 0);
    }

    #[test]
    fn verify_rejects_wrong_amount() {
        let f = file();
        let entry = f.get(0).unwrap();
        let args = VerifyArgs {
            root: f.root,
            index: 0,
            recipient: acct(1),
            amount: 101,
            proof: entry.proof.siblings().to_vec(),
            algorithm: None,
        };
        assert_eq!(run_verify(&args, &CliConfig::default()).unwrap(), 1);
    }

    #[test]
    fn prove_unknown_recipient_reports_no_allocation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commitment.json");
        crate::commit::write_atomic(&path, &serde_json::to_vec(&file()).unwrap()).unwrap();
        let args = ProveArgs {
            commitment: path.clone(),
            index: None,
            recipient: Some(acct(9)),
        };
        assert_eq!(run_prove(&args, &CliConfig::default()).unwrap(), 1);
        let args = ProveArgs {
            commitment: path,
            index: None,
            recipient: Some(acct(1)),
        };
        assert_eq!(run_prove(&args, &CliConfig::default()).unwrap(), 0);
    }

    #[test]
    fn prove_refuses_entry_not_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commitment.json");
        let mut f = file();
        f.allocations[2].amount = 3_000;
        crate::commit::write_atomic(&path, &serde_json::to_vec(&f).unwrap()).unwrap();
        let args = |index| ProveArgs {
            commitment: path.clone(),
            index: Some(index),
            recipient: None,
        };
        assert_eq!(run_prove(&args(2), &CliConfig::default()).unwrap(), 1);
        assert_eq!(run_prove(&args(0), &CliConfig::default()).unwrap(), 0);
    }
}
