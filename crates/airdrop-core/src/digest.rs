//! # Merkle Digests
//!
//! Defines `MerkleDigest`, the 32-byte value used for leaves, interior nodes
//! and roots, and `HashAlgorithm`, the tag recorded next to every published
//! root.
//!
//! ## Ordering
//!
//! `MerkleDigest` derives `Ord` over its byte array, which compares by
//! unsigned byte value, most significant byte first. The canonical pair
//! order used to combine siblings relies on exactly this ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Width of every digest in the tree.
pub const DIGEST_LEN: usize = 32;

/// The hash function a commitment was built with.
///
/// `Keccak256` matches the on-chain program that consumes the roots and is
/// the default. `Sha256` is available for deployments that prefer it. Roots
/// built with different algorithms are never interchangeable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Keccak-256 (original padding, not SHA3-256).
    #[default]
    Keccak256,
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keccak256 => "keccak256",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keccak256" | "keccak" => Ok(Self::Keccak256),
            "sha256" => Ok(Self::Sha256),
            other => Err(ParseError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// A 32-byte node of the Merkle tree: leaf digest, interior node or root.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MerkleDigest([u8; DIGEST_LEN]);

impl MerkleDigest {
    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Render as lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex characters, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let trimmed = s.trim();
        let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if cleaned.len() != DIGEST_LEN * 2 {
            return Err(ParseError::InvalidLength {
                what: "digest",
                expected: DIGEST_LEN,
                actual: cleaned.len() / 2,
            });
        }
        let mut out = [0u8; DIGEST_LEN];
        hex::decode_to_slice(cleaned, &mut out)
            .map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        Ok(Self(out))
    }

    /// Copy a digest out of a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let arr: [u8; DIGEST_LEN] = bytes.try_into().map_err(|_| ParseError::InvalidLength {
            what: "digest",
            expected: DIGEST_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl AsRef<[u8]> for MerkleDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; DIGEST_LEN]> for MerkleDigest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for MerkleDigest {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for MerkleDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for MerkleDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MerkleDigest({})", self.to_hex())
    }
}

impl Serialize for MerkleDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MerkleDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_with_prefix() {
        let d = MerkleDigest::new([0xAB; 32]);
        let prefixed = format!("0x{}", d.to_hex());
        assert_eq!(MerkleDigest::from_hex(&prefixed).unwrap(), d);
        assert_eq!(MerkleDigest::from_hex(&d.to_hex()).unwrap(), d);
    }

    #[test]
    fn test_hex_rejects_wrong_length() {
        assert!(matches!(
            MerkleDigest::from_hex("aabb"),
            Err(ParseError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_hex_rejects_non_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(
            MerkleDigest::from_hex(&bad),
            Err(ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_ordering_is_unsigned_bytewise() {
        let mut low = [0u8; 32];
        let mut high = [0u8; 32];
        low[0] = 0x7f;
        high[0] = 0x80;
        assert!(MerkleDigest::new(low) < MerkleDigest::new(high));

        // First differing byte decides, later bytes do not.
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        a[1] = 1;
        b[31] = 0xff;
        assert!(MerkleDigest::new(b) < MerkleDigest::new(a));
    }

    #[test]
    fn test_algorithm_parse_and_display() {
        assert_eq!("keccak256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Keccak256);
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!("md5".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::default().to_string(), "keccak256");
    }

    #[test]
    fn test_serde_forms() {
        let d = MerkleDigest::new([1; 32]);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        assert_eq!(
            serde_json::to_string(&HashAlgorithm::Sha256).unwrap(),
            "\"sha256\""
        );
    }
}
