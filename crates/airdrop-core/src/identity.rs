//! # Identity Newtypes
//!
//! 32-byte identifiers for accounts (claimants, authorities, destinations)
//! and funding assets. Both render as base58, the format used by the
//! allocation source and by the ledger substrate.
//!
//! ## Security Invariant
//!
//! `AccountId` and `AssetId` are distinct types. A mint identifier cannot be
//! substituted for a claimant, and vice versa, anywhere in the ledger API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// A 32-byte account identifier (recipient, authority or destination).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; 32]);

/// A 32-byte identifier of the asset being distributed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId([u8; 32]);

macro_rules! impl_key_newtype {
    ($name:ident, $what:literal) => {
        impl $name {
            /// Wrap raw identifier bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw identifier bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Render as base58.
            pub fn to_base58(&self) -> String {
                bs58::encode(self.0).into_string()
            }

            /// Parse from base58, requiring exactly 32 decoded bytes.
            pub fn from_base58(s: &str) -> Result<Self, ParseError> {
                let bytes = bs58::decode(s.trim())
                    .into_vec()
                    .map_err(|e| ParseError::InvalidBase58(e.to_string()))?;
                let arr: [u8; 32] =
                    bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| ParseError::InvalidLength {
                            what: $what,
                            expected: 32,
                            actual: bytes.len(),
                        })?;
                Ok(Self(arr))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_base58(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_base58())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_base58())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_base58())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_base58(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_key_newtype!(AccountId, "account id");
impl_key_newtype!(AssetId, "asset id");
