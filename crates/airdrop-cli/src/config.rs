//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every field has a default, so
//! an absent file and an empty file behave the same. Command-line flags
//! override file values.
//!
//! ```yaml
//! ledger_dir: .airdrop-ledger
//! hash_algorithm: keccak256
//! decimals: 9
//! journal: transfers.jsonl
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use airdrop_core::HashAlgorithm;

/// Settings shared by all subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Directory of the file-backed claim ledger.
    pub ledger_dir: PathBuf,
    /// Hash function used when building new commitments.
    pub hash_algorithm: HashAlgorithm,
    /// Fractional digits used when rendering amounts.
    pub decimals: u8,
    /// Transfer journal. Relative paths resolve against `ledger_dir`.
    pub journal: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ledger_dir: PathBuf::from(".airdrop-ledger"),
            hash_algorithm: HashAlgorithm::Keccak256,
            decimals: 9,
            journal: PathBuf::from("transfers.jsonl"),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Parse YAML. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Replace the ledger directory if one was given on the command line.
    pub fn with_ledger_dir(mut self, ledger_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = ledger_dir {
            self.ledger_dir = dir;
        }
        self
    }

    /// Resolved journal location.
    pub fn journal_path(&self) -> PathBuf {
        if self.journal.is_absolute() {
            self.journal.clone()
        } else {
            self.ledger_dir.join(&self.journal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(CliConfig::from_yaml("").unwrap(), CliConfig::default());
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let cfg = CliConfig::from_yaml("hash_algorithm: sha256\ndecimals: 6\n").unwrap();
        assert_eq!(cfg.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(cfg.decimals, 6);
        assert_eq!(cfg.ledger_dir, PathBuf::from(".airdrop-ledger"));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(CliConfig::from_yaml("ledger: x\n").is_err());
    }

    #[test]
    fn journal_resolves_against_ledger_dir() {
        let cfg = CliConfig::default().with_ledger_dir(Some(PathBuf::from("/srv/ledger")));
        assert_eq!(cfg.journal_path(), PathBuf::from("/srv/ledger/transfers.jsonl"));
        let cfg = CliConfig {
            journal: PathBuf::from("/var/log/transfers.jsonl"),
            ..cfg
        };
        assert_eq!(cfg.journal_path(), PathBuf::from("/var/log/transfers.jsonl"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airdrop.yaml");
        std::fs::write(&path, "ledger_dir: /tmp/elsewhere\n").unwrap();
        let cfg = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.ledger_dir, PathBuf::from("/tmp/elsewhere"));
        assert!(CliConfig::load(Some(&dir.path().join("missing.yaml"))).is_err());
    }
}
