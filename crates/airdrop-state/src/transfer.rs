//! # Transfer Authorizations
//!
//! The ledger decides *whether* value may move; a [`TransferSubstrate`]
//! moves it. A [`TransferAuthorization`] names an exact amount (or the whole
//! remaining pool) and an exact destination.
//!
//! [`TransferJournal`] is a substrate that appends each executed
//! authorization as one JSON line to a file. It is what the CLI uses in
//! place of a live ledger network.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airdrop_core::{AccountId, AssetId, StoreError};

use crate::airdrop::{AirdropKey, TokenStandard};

/// How much to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum TransferAmount {
    /// Exactly this many base units.
    Exact(u64),
    /// Whatever balance the pool holds at execution time.
    Remaining,
}

impl std::fmt::Display for TransferAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Remaining => f.write_str("all remaining"),
        }
    }
}

/// A transfer the ledger has approved but not executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAuthorization {
    /// Airdrop whose pool funds the transfer.
    pub airdrop: AirdropKey,
    /// Asset to move.
    pub asset: AssetId,
    /// Receiving account.
    pub destination: AccountId,
    /// Amount to move.
    pub amount: TransferAmount,
    /// Transfer program to use.
    pub token_standard: TokenStandard,
}

/// Record of an executed authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// The authorization that was executed.
    pub authorization: TransferAuthorization,
    /// When the substrate executed it.
    pub executed_at: DateTime<Utc>,
}

/// Executes transfer authorizations.
pub trait TransferSubstrate {
    /// Move value as authorized.
    fn execute(&self, authorization: &TransferAuthorization)
        -> Result<TransferReceipt, StoreError>;
}

/// Append-only JSON-lines log of executed transfers.
#[derive(Debug, Clone)]
pub struct TransferJournal {
    path: PathBuf,
}

impl TransferJournal {
    /// Journal at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All receipts recorded so far, oldest first.
    pub fn entries(&self) -> Result<Vec<TransferReceipt>, StoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let receipt = serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
                location: format!("{}:{}", self.path.display(), n + 1),
                reason: e.to_string(),
            })?;
            out.push(receipt);
        }
        Ok(out)
    }
}

impl TransferSubstrate for TransferJournal {
    fn execute(
        &self,
        authorization: &TransferAuthorization,
    ) -> Result<TransferReceipt, StoreError> {
        let receipt = TransferReceipt {
            authorization: authorization.clone(),
            executed_at: Utc::now(),
        };
        let mut line =
            serde_json::to_vec(&receipt).map_err(|e| StoreError::Serialization(e.to_string()))?;
        line.push(b'\n');

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        file.sync_data()?;

        tracing::info!(
            destination = %authorization.destination,
            amount = %authorization.amount,
            token_standard = %authorization.token_standard,
            "transfer executed"
        );
        Ok(receipt)
    }
}
