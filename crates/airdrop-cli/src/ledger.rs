//! # Ledger Subcommands
//!
//! `init`, `claim`, `status` and `withdraw` against the file-backed claim
//! ledger under the configured `ledger_dir`. Authorized transfers are
//! executed by appending them to the transfer journal.
//!
//! Callers are taken from the command line as given. Authenticating them is
//! the job of whatever drives this tool.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use airdrop_core::{
    format_amount, AccountId, AirdropError, AssetId, LedgerError, MerkleDigest, VerificationData,
};
use airdrop_state::{
    AirdropState, ClaimLedger, ClaimStatus, FileClaimStore, TokenStandard, TransferJournal,
    TransferSubstrate,
};

use crate::commit::CommitmentFile;
use crate::config::CliConfig;
use crate::prove::lookup;

/// Arguments for `airdrop init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Commitment file written by `airdrop build`.
    #[arg(long, value_name = "FILE")]
    pub commitment: PathBuf,

    /// Funding asset (base58).
    #[arg(long)]
    pub asset: AssetId,

    /// Authority allowed to withdraw the residual pool (base58).
    #[arg(long)]
    pub authority: AccountId,

    /// Fund through the extended token program.
    #[arg(long = "token-2022")]
    pub token_2022: bool,
}

/// Arguments for `airdrop claim`.
#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Commitment file written by `airdrop build`.
    #[arg(long, value_name = "FILE")]
    pub commitment: PathBuf,

    /// Funding asset (base58).
    #[arg(long)]
    pub asset: AssetId,

    /// Claiming account (base58).
    #[arg(long)]
    pub claimant: AccountId,

    /// Allocation index. Defaults to the claimant's first allocation.
    #[arg(long)]
    pub index: Option<u64>,

    /// Encoded verification payload (hex) as printed by `airdrop prove`.
    /// Defaults to the proof listed in the commitment file.
    #[arg(long, value_name = "HEX")]
    pub verification_data: Option<String>,
}

/// Arguments for `airdrop status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Commitment file written by `airdrop build`.
    #[arg(long, value_name = "FILE")]
    pub commitment: PathBuf,

    /// Funding asset (base58).
    #[arg(long)]
    pub asset: AssetId,

    /// Recipient account (base58).
    #[arg(long)]
    pub recipient: AccountId,
}

/// Arguments for `airdrop withdraw`.
#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Published root (hex).
    #[arg(long)]
    pub root: MerkleDigest,

    /// Funding asset (base58).
    #[arg(long)]
    pub asset: AssetId,

    /// Calling authority (base58).
    #[arg(long)]
    pub authority: AccountId,

    /// Account receiving the residual pool (base58).
    #[arg(long)]
    pub destination: AccountId,
}

fn open_ledger(config: &CliConfig) -> Result<ClaimLedger<FileClaimStore>> {
    let store = FileClaimStore::open(&config.ledger_dir).with_context(|| {
        format!("failed to open ledger at {}", config.ledger_dir.display())
    })?;
    Ok(ClaimLedger::new(store))
}

/// Map a rejection to `FAIL:` and exit code 1; anything else is an error.
fn reject(e: impl Into<AirdropError>) -> Result<u8> {
    let e = e.into();
    if e.is_rejection() {
        println!("FAIL: {e}");
        Ok(1)
    } else {
        Err(e.into())
    }
}

/// Execute `airdrop init`.
pub fn run_init(args: &InitArgs, config: &CliConfig) -> Result<u8> {
    let file = CommitmentFile::load(&args.commitment)?;
    let token_standard = if args.token_2022 {
        TokenStandard::Token2022
    } else {
        TokenStandard::Classic
    };
    let state = AirdropState::new(args.authority, args.asset, file.root, file.allocation_count)
        .with_token_standard(token_standard)
        .with_hash_algorithm(file.hash_algorithm);

    let ledger = open_ledger(config)?;
    match ledger.initialize(state) {
        Ok(state) => {
            println!("OK: initialized airdrop {}", state.key());
            Ok(0)
        }
        Err(e) => reject(e),
    }
}

/// Execute `airdrop claim`.
pub fn run_claim(args: &ClaimArgs, config: &CliConfig) -> Result<u8> {
    let file = CommitmentFile::load(&args.commitment)?;
    let Some(entry) = lookup(&file, args.index, Some(&args.claimant)) else {
        println!("no allocation");
        return Ok(1);
    };

    let payload = match &args.verification_data {
        Some(text) => hex::decode(text.trim().trim_start_matches("0x"))
            .context("verification data is not valid hex")?,
        None => VerificationData::new(entry.index, entry.proof.siblings().to_vec()).encode(),
    };

    let ledger = open_ledger(config)?;
    let state = ledger.load_state(args.asset, file.root)?;
    let authorization = match ledger.redeem_encoded(&state, args.claimant, entry.amount, &payload)
    {
        Ok(auth) => auth,
        Err(e @ AirdropError::Ledger(LedgerError::AlreadyClaimed { .. })) => {
            println!("CLAIMED: {e}");
            return Ok(1);
        }
        Err(e) => return reject(e),
    };

    let journal = TransferJournal::new(config.journal_path());
    journal
        .execute(&authorization)
        .with_context(|| format!("failed to record transfer in {}", journal.path().display()))?;
    println!(
        "OK: claimed {} to {}",
        format_amount(entry.amount, config.decimals),
        args.claimant
    );
    Ok(0)
}

/// Execute `airdrop status`.
pub fn run_status(args: &StatusArgs, config: &CliConfig) -> Result<u8> {
    let file = CommitmentFile::load(&args.commitment)?;
    let Some(entry) = file.find(&args.recipient) else {
        println!("no allocation");
        return Ok(0);
    };

    let ledger = open_ledger(config)?;
    let state = ledger.load_state(args.asset, file.root)?;
    let status = match ledger.claim_status(&state, entry.index) {
        Ok(status) => status,
        Err(e) => return reject(e),
    };
    match &status {
        ClaimStatus::Claimed(record) => println!(
            "{status}: index {} amount {} at {}",
            record.index,
            format_amount(record.amount, config.decimals),
            record.claimed_at.to_rfc3339()
        ),
        ClaimStatus::Unclaimed => println!(
            "{status}: index {} amount {}",
            entry.index,
            format_amount(entry.amount, config.decimals)
        ),
    }
    Ok(0)
}

/// Execute `airdrop withdraw`.
pub fn run_withdraw(args: &WithdrawArgs, config: &CliConfig) -> Result<u8> {
    let ledger = open_ledger(config)?;
    let state = ledger.load_state(args.asset, args.root)?;
    let authorization = match ledger.withdraw_residual(&state, args.authority, args.destination) {
        Ok(auth) => auth,
        Err(e) => return reject(e),
    };
    TransferJournal::new(config.journal_path()).execute(&authorization)?;
    println!(
        "OK: residual of {} authorized to {}",
        state.asset, args.destination
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_core::{Allocation, HashAlgorithm};
    use airdrop_state::TransferAmount;

    const ASSET: AssetId = AssetId::new([0x11; 32]);
    const AUTHORITY: AccountId = AccountId::new([0xFF; 32]);

    fn acct(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        config: CliConfig,
        commitment: PathBuf,
        root: MerkleDigest,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let allocs = vec![
            Allocation::new(0, acct(1), 100),
            Allocation::new(1, acct(2), 200),
            Allocation::new(2, acct(3), 300),
        ];
        let file = CommitmentFile::build(&allocs, HashAlgorithm::Keccak256).unwrap();
        let commitment = dir.path().join("commitment.json");
        crate::commit::write_atomic(&commitment, &serde_json::to_vec(&file).unwrap()).unwrap();
        let config = CliConfig::default().with_ledger_dir(Some(dir.path().join("ledger")));
        let init = InitArgs {
            commitment: commitment.clone(),
            asset: ASSET,
            authority: AUTHORITY,
            token_2022: false,
        };
        assert_eq!(run_init(&init, &config).unwrap(), 0);
        Fixture {
            _dir: dir,
            config,
            commitment,
            root: file.root,
        }
    }

    fn claim(fx: &Fixture, claimant: AccountId) -> u8 {
        let args = ClaimArgs {
            commitment: fx.commitment.clone(),
            asset: ASSET,
            claimant,
            index: None,
            verification_data: None,
        };
        run_claim(&args, &fx.config).unwrap()
    }

    #[test]
    fn init_twice_fails() {
        let fx = fixture();
        let init = InitArgs {
            commitment: fx.commitment.clone(),
            asset: ASSET,
            authority: AUTHORITY,
            token_2022: true,
        };
        assert_eq!(run_init(&init, &fx.config).unwrap(), 1);
    }

    #[test]
    fn claim_once_then_claimed() {
        let fx = fixture();
        assert_eq!(claim(&fx, acct(2)), 0);
        assert_eq!(claim(&fx, acct(2)), 1);
        let entries = TransferJournal::new(fx.config.journal_path())
            .entries()
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].authorization.amount, TransferAmount::Exact(200));
    }

    #[test]
    fn claim_without_allocation() {
        let fx = fixture();
        assert_eq!(claim(&fx, acct(9)), 1);
        assert!(TransferJournal::new(fx.config.journal_path())
            .entries()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn claim_for_uninitialized_asset_fails() {
        let fx = fixture();
        let args = ClaimArgs {
            commitment: fx.commitment.clone(),
            asset: AssetId::new([0x22; 32]),
            claimant: acct(1),
            index: None,
            verification_data: None,
        };
        assert!(run_claim(&args, &fx.config).is_err());
    }

    fn journal_is_empty(fx: &Fixture) -> bool {
        TransferJournal::new(fx.config.journal_path())
            .entries()
            .unwrap()
            .is_empty()
    }

    #[test]
    fn claim_against_tampered_entry_is_rejected() {
        let fx = fixture();
        let mut file = CommitmentFile::load(&fx.commitment).unwrap();
        file.allocations[1].amount = 2_000;
        crate::commit::write_atomic(&fx.commitment, &serde_json::to_vec(&file).unwrap())
            .unwrap();
        assert_eq!(claim(&fx, acct(2)), 1);
        assert!(journal_is_empty(&fx));
        // Entries the edit did not touch still claim.
        assert_eq!(claim(&fx, acct(1)), 0);
    }

    #[test]
    fn claim_with_submitted_payload() {
        let fx = fixture();
        let file = CommitmentFile::load(&fx.commitment).unwrap();
        let run = |verification_data: &str| {
            let args = ClaimArgs {
                commitment: fx.commitment.clone(),
                asset: ASSET,
                claimant: acct(3),
                index: None,
                verification_data: Some(verification_data.to_string()),
            };
            run_claim(&args, &fx.config)
        };

        // Not hex: malformed input.
        assert!(run("zz").is_err());
        // Too short to hold an index.
        assert_eq!(run("00").unwrap(), 1);
        // Proof for another allocation.
        let other = file.get(0).unwrap();
        let wrong = VerificationData::new(2, other.proof.siblings().to_vec()).encode();
        assert_eq!(run(&hex::encode(wrong)).unwrap(), 1);
        assert!(journal_is_empty(&fx));

        let entry = file.get(2).unwrap();
        let right = VerificationData::new(2, entry.proof.siblings().to_vec()).encode();
        assert_eq!(run(&format!("0x{}", hex::encode(right))).unwrap(), 0);
        assert_eq!(claim(&fx, acct(3)), 1);
    }

    #[test]
    fn status_for_index_beyond_airdrop_is_rejected() {
        let fx = fixture();
        let mut file = CommitmentFile::load(&fx.commitment).unwrap();
        let extra = Allocation::new(3, acct(4), 400);
        file.allocations.push(crate::commit::CommittedAllocation {
            index: extra.index,
            recipient: extra.recipient,
            amount: extra.amount,
            proof: file.allocations[0].proof.clone(),
        });
        file.allocation_count = 4;
        crate::commit::write_atomic(&fx.commitment, &serde_json::to_vec(&file).unwrap())
            .unwrap();
        let args = StatusArgs {
            commitment: fx.commitment.clone(),
            asset: ASSET,
            recipient: acct(4),
        };
        assert_eq!(run_status(&args, &fx.config).unwrap(), 1);
    }

    #[test]
    fn status_reflects_claims() {
        let fx = fixture();
        let status = |recipient| {
            let args = StatusArgs {
                commitment: fx.commitment.clone(),
                asset: ASSET,
                recipient,
            };
            run_status(&args, &fx.config).unwrap()
        };
        assert_eq!(status(acct(1)), 0);
        assert_eq!(claim(&fx, acct(1)), 0);
        assert_eq!(status(acct(1)), 0);
        assert_eq!(status(acct(9)), 0);
    }

    #[test]
    fn withdraw_requires_authority() {
        let fx = fixture();
        let args = WithdrawArgs {
            root: fx.root,
            asset: ASSET,
            authority: acct(1),
            destination: acct(1),
        };
        assert_eq!(run_withdraw(&args, &fx.config).unwrap(), 1);
        let args = WithdrawArgs {
            authority: AUTHORITY,
            ..args
        };
        assert_eq!(run_withdraw(&args, &fx.config).unwrap(), 0);
        let entries = TransferJournal::new(fx.config.journal_path())
            .entries()
            .unwrap();
        assert_eq!(entries[0].authorization.amount, TransferAmount::Remaining);
    }
}
