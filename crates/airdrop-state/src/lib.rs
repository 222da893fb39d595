//! # airdrop-state: Claim Ledger
//!
//! The stateful half of a Merkle airdrop. An [`AirdropState`] publishes a
//! root for one funding asset; the [`ClaimLedger`] checks each redemption
//! against that root and records it exactly once.
//!
//! ## State Machines
//!
//! - **Airdrop** (`airdrop.rs`): `Uninitialized → Active`. There is no
//!   closed state; residual withdrawal leaves the airdrop active.
//! - **Claim** (per index): `Unclaimed → Claimed`, terminal. The existence of
//!   a [`ClaimRecord`] is the only signal that an index has been paid.
//!
//! ## Persistence
//!
//! - **Store** (`store.rs`): the [`ClaimStore`] trait with unique-create
//!   semantics, and the in-memory [`MemoryClaimStore`].
//! - **File store** (`file_store.rs`): one JSON file per record, created
//!   with a no-clobber link so the check and the create are one step.
//!
//! ## Value Movement
//!
//! The ledger never moves value. It returns a [`TransferAuthorization`]
//! which a [`TransferSubstrate`] executes (`transfer.rs`).

pub mod airdrop;
pub mod file_store;
pub mod ledger;
pub mod store;
pub mod transfer;

pub use airdrop::{AirdropKey, AirdropState, ClaimRecord, ClaimStatus, TokenStandard};
pub use file_store::FileClaimStore;
pub use ledger::ClaimLedger;
pub use store::{ClaimStore, CreateOutcome, MemoryClaimStore};
pub use transfer::{
    TransferAmount, TransferAuthorization, TransferJournal, TransferReceipt, TransferSubstrate,
};
