//! # Claim Stores
//!
//! Persistence for airdrop states and claim records. Every create is a
//! unique-create: it either inserts a record that did not exist or reports
//! [`CreateOutcome::AlreadyExists`] without touching the stored one. The
//! existence check and the insert are a single atomic step in every
//! implementation, which is what makes redemption exactly-once under
//! concurrency.
//!
//! Records are scoped per index. Nothing locks across indices.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use airdrop_core::StoreError;

use crate::airdrop::{AirdropKey, AirdropState, ClaimRecord};

/// Result of a unique-create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record was inserted.
    Created,
    /// A record with the same key already existed. Nothing was written.
    AlreadyExists,
}

/// Durable storage for airdrop states and claim records.
pub trait ClaimStore: Send + Sync {
    /// Insert `state` under its key unless one exists.
    fn create_state(&self, state: &AirdropState) -> Result<CreateOutcome, StoreError>;

    /// Load the state stored under `key`.
    fn load_state(&self, key: &AirdropKey) -> Result<Option<AirdropState>, StoreError>;

    /// Insert `record` under `(record.airdrop, record.index)` unless one
    /// exists. Must be atomic with respect to concurrent calls for the same
    /// key.
    fn create_claim(&self, record: &ClaimRecord) -> Result<CreateOutcome, StoreError>;

    /// Load the claim record for `index`, if any.
    fn load_claim(&self, key: &AirdropKey, index: u64) -> Result<Option<ClaimRecord>, StoreError>;
}

impl<S: ClaimStore + ?Sized> ClaimStore for Arc<S> {
    fn create_state(&self, state: &AirdropState) -> Result<CreateOutcome, StoreError> {
        (**self).create_state(state)
    }

    fn load_state(&self, key: &AirdropKey) -> Result<Option<AirdropState>, StoreError> {
        (**self).load_state(key)
    }

    fn create_claim(&self, record: &ClaimRecord) -> Result<CreateOutcome, StoreError> {
        (**self).create_claim(record)
    }

    fn load_claim(&self, key: &AirdropKey, index: u64) -> Result<Option<ClaimRecord>, StoreError> {
        (**self).load_claim(key, index)
    }
}

struct Inner {
    states: DashMap<AirdropKey, AirdropState>,
    claims: DashMap<(AirdropKey, u64), ClaimRecord>,
}

/// In-memory store. Does not survive restarts.
///
/// Cheaply cloneable via `Arc`; all clones share the same data. Uniqueness
/// comes from the `DashMap` entry API, which holds the shard lock across
/// the check and the insert.
#[derive(Clone)]
pub struct MemoryClaimStore {
    inner: Arc<Inner>,
}

impl MemoryClaimStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                states: DashMap::new(),
                claims: DashMap::new(),
            }),
        }
    }

    /// Number of claim records across all airdrops.
    pub fn claim_count(&self) -> usize {
        self.inner.claims.len()
    }
}

impl Default for MemoryClaimStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryClaimStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryClaimStore")
            .field("states", &self.inner.states.len())
            .field("claims", &self.inner.claims.len())
            .finish()
    }
}

impl ClaimStore for MemoryClaimStore {
    fn create_state(&self, state: &AirdropState) -> Result<CreateOutcome, StoreError> {
        match self.inner.states.entry(state.key()) {
            Entry::Occupied(_) => Ok(CreateOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(state.clone());
                Ok(CreateOutcome::Created)
            }
        }
    }

    fn load_state(&self, key: &AirdropKey) -> Result<Option<AirdropState>, StoreError> {
        Ok(self.inner.states.get(key).map(|s| s.value().clone()))
    }

    fn create_claim(&self, record: &ClaimRecord) -> Result<CreateOutcome, StoreError> {
        match self.inner.claims.entry((record.airdrop, record.index)) {
            Entry::Occupied(_) => Ok(CreateOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(CreateOutcome::Created)
            }
        }
    }

    fn load_claim(&self, key: &AirdropKey, index: u64) -> Result<Option<ClaimRecord>, StoreError> {
        Ok(self
            .inner
            .claims
            .get(&(*key, index))
            .map(|r| r.value().clone()))
    }
}
