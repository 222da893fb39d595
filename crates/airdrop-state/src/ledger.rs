//! # Claim Ledger
//!
//! Validates redemptions against a published root and records each one
//! exactly once.
//!
//! ## Redemption
//!
//! 1. `index < allocation_count`, else `IndexOutOfRange`.
//! 2. Recompute the leaf digest from `(index, claimant, amount)`.
//! 3. Fold the proof up to a root and compare with `state.root`, else
//!    `ProofInvalid`. The root always comes from the state, never from an
//!    allocation list.
//! 4. Unique-create the claim record, else `AlreadyClaimed`.
//! 5. Return the transfer authorization.
//!
//! Nothing is written before step 4, and step 4 is the single atomic
//! commit point. A rejected redemption leaves the store unchanged.

use chrono::Utc;

use airdrop_core::{
    AccountId, AirdropError, Allocation, AssetId, LedgerError, MerkleDigest, VerificationData,
};
use airdrop_crypto::{leaf_digest, max_proof_len, verify_proof};

use crate::airdrop::{AirdropKey, AirdropState, ClaimRecord, ClaimStatus};
use crate::store::{ClaimStore, CreateOutcome};
use crate::transfer::{TransferAmount, TransferAuthorization};

const REDEMPTIONS_TOTAL: &str = "airdrop_redemptions_total";
const REDEMPTIONS_REJECTED_TOTAL: &str = "airdrop_redemptions_rejected_total";
const RESIDUAL_WITHDRAWALS_TOTAL: &str = "airdrop_residual_withdrawals_total";

/// The claim ledger over a [`ClaimStore`].
#[derive(Debug, Clone)]
pub struct ClaimLedger<S> {
    store: S,
}

impl<S: ClaimStore> ClaimLedger<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Publish an airdrop. No funds move.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AlreadyInitialized`] if a state exists for the same
    /// (asset, root).
    pub fn initialize(&self, state: AirdropState) -> Result<AirdropState, LedgerError> {
        match self.store.create_state(&state)? {
            CreateOutcome::Created => {
                tracing::info!(
                    asset = %state.asset,
                    root = %state.root,
                    authority = %state.authority,
                    allocations = state.allocation_count,
                    algorithm = %state.hash_algorithm,
                    "airdrop initialized"
                );
                Ok(state)
            }
            CreateOutcome::AlreadyExists => Err(LedgerError::AlreadyInitialized {
                asset: state.asset,
                root: state.root,
            }),
        }
    }

    /// Load a published airdrop.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownAirdrop`] if nothing is stored for the key.
    pub fn load_state(&self, asset: AssetId, root: MerkleDigest) -> Result<AirdropState, LedgerError> {
        self.store
            .load_state(&AirdropKey::new(asset, root))?
            .ok_or(LedgerError::UnknownAirdrop { asset, root })
    }

    /// Redeem allocation `index` for `claimant`.
    pub fn redeem(
        &self,
        state: &AirdropState,
        claimant: AccountId,
        index: u64,
        amount: u64,
        proof: &[MerkleDigest],
    ) -> Result<TransferAuthorization, LedgerError> {
        let result = self.try_redeem(state, claimant, index, amount, proof);
        match &result {
            Ok(_) => {
                metrics::counter!(REDEMPTIONS_TOTAL).increment(1);
                tracing::info!(
                    index,
                    claimant = %claimant,
                    amount,
                    root = %state.root,
                    "allocation redeemed"
                );
            }
            Err(e) => {
                metrics::counter!(REDEMPTIONS_REJECTED_TOTAL, "reason" => e.kind()).increment(1);
                tracing::warn!(
                    index,
                    claimant = %claimant,
                    root = %state.root,
                    reason = e.kind(),
                    "redemption rejected: {e}"
                );
            }
        }
        result
    }

    /// Redeem using the encoded verification payload.
    pub fn redeem_with_data(
        &self,
        state: &AirdropState,
        claimant: AccountId,
        amount: u64,
        data: &VerificationData,
    ) -> Result<TransferAuthorization, LedgerError> {
        self.redeem(state, claimant, data.index, amount, &data.proof)
    }

    /// Redeem from raw payload bytes as submitted by a claimant.
    ///
    /// A payload that does not decode is rejected before the store is
    /// touched.
    pub fn redeem_encoded(
        &self,
        state: &AirdropState,
        claimant: AccountId,
        amount: u64,
        payload: &[u8],
    ) -> Result<TransferAuthorization, AirdropError> {
        let data = VerificationData::decode(payload)?;
        Ok(self.redeem_with_data(state, claimant, amount, &data)?)
    }

    fn try_redeem(
        &self,
        state: &AirdropState,
        claimant: AccountId,
        index: u64,
        amount: u64,
        proof: &[MerkleDigest],
    ) -> Result<TransferAuthorization, LedgerError> {
        if index >= state.allocation_count {
            return Err(LedgerError::IndexOutOfRange {
                index,
                count: state.allocation_count,
            });
        }

        let leaf = leaf_digest(
            state.hash_algorithm,
            &Allocation::new(index, claimant, amount),
        );
        if proof.len() > max_proof_len(state.allocation_count)
            || !verify_proof(state.hash_algorithm, &state.root, &leaf, index, proof)
        {
            return Err(LedgerError::ProofInvalid { index });
        }

        let record = ClaimRecord {
            airdrop: state.key(),
            index,
            recipient: claimant,
            amount,
            claimed_at: Utc::now(),
        };
        match self.store.create_claim(&record)? {
            CreateOutcome::AlreadyExists => Err(LedgerError::AlreadyClaimed { index }),
            CreateOutcome::Created => Ok(TransferAuthorization {
                airdrop: state.key(),
                asset: state.asset,
                destination: claimant,
                amount: TransferAmount::Exact(amount),
                token_standard: state.token_standard,
            }),
        }
    }

    /// Authorize moving the whole remaining pool to `destination`.
    ///
    /// Allowed at any time and independent of outstanding claims.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotAuthorized`] unless `caller` is the authority.
    pub fn withdraw_residual(
        &self,
        state: &AirdropState,
        caller: AccountId,
        destination: AccountId,
    ) -> Result<TransferAuthorization, LedgerError> {
        if caller != state.authority {
            tracing::warn!(caller = %caller, root = %state.root, "residual withdrawal rejected");
            return Err(LedgerError::NotAuthorized { caller });
        }
        metrics::counter!(RESIDUAL_WITHDRAWALS_TOTAL).increment(1);
        tracing::info!(
            destination = %destination,
            asset = %state.asset,
            root = %state.root,
            "residual withdrawal authorized"
        );
        Ok(TransferAuthorization {
            airdrop: state.key(),
            asset: state.asset,
            destination,
            amount: TransferAmount::Remaining,
            token_standard: state.token_standard,
        })
    }

    /// Whether `index` has been redeemed.
    pub fn claim_status(&self, state: &AirdropState, index: u64) -> Result<ClaimStatus, LedgerError> {
        if index >= state.allocation_count {
            return Err(LedgerError::IndexOutOfRange {
                index,
                count: state.allocation_count,
            });
        }
        Ok(match self.store.load_claim(&state.key(), index)? {
            Some(record) => ClaimStatus::Claimed(record),
            None => ClaimStatus::Unclaimed,
        })
    }
}
