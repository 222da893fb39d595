//! # airdrop-cli: Merkle Airdrop Toolchain
//!
//! Provides the `airdrop` command-line interface.
//!
//! ## Subcommands
//!
//! - `airdrop build`: commit an allocation list and write every proof.
//! - `airdrop prove`: print one allocation's proof and verification payload.
//! - `airdrop verify`: check a proof against a root.
//! - `airdrop init`: publish an airdrop into the local ledger.
//! - `airdrop claim`: redeem an allocation and journal the transfer.
//! - `airdrop status`: `CLAIMED`, `UNCLAIMED`, or `no allocation`.
//! - `airdrop withdraw`: authorize the residual pool to a destination.
//!
//! ```bash
//! airdrop build --allocations amounts.json --out commitment.json
//! airdrop init --commitment commitment.json --asset <mint> --authority <key>
//! airdrop claim --commitment commitment.json --asset <mint> --claimant <key>
//! ```
//!
//! Handlers return the process exit code: 0 on success, 1 for a definitive
//! negative answer (invalid proof or payload, already claimed, index out of
//! range, unauthorized caller, no allocation). Errors are reserved for I/O,
//! unknown airdrops and malformed input and exit with 2.

pub mod commit;
pub mod config;
pub mod ledger;
pub mod prove;
