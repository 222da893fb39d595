//! # Allocations
//!
//! An `Allocation` is one recipient's entitlement at a fixed position of the
//! canonical ordered list. The list is the source of truth: reordering it
//! changes every leaf digest and invalidates every previously issued proof.
//!
//! ## Leaf Preimage
//!
//! ```text
//! index_LE(8) || recipient(32) || amount_LE(8)      (48 bytes)
//! ```
//!
//! The index is part of the preimage, so a leaf authenticates its own
//! position without the verifier having to know which side a sibling is on.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ParseError;
use crate::identity::AccountId;

/// Length of the byte string hashed into a leaf digest.
pub const LEAF_PREIMAGE_LEN: usize = 8 + 32 + 8;

/// One recipient's entitlement at a fixed position of the ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allocation {
    /// 0-based position in the canonical ordered list.
    pub index: u64,
    /// The account entitled to claim.
    pub recipient: AccountId,
    /// Quantity in base units.
    pub amount: u64,
}

impl Allocation {
    /// Create an allocation.
    pub fn new(index: u64, recipient: AccountId, amount: u64) -> Self {
        Self {
            index,
            recipient,
            amount,
        }
    }

    /// The exact bytes hashed into this allocation's leaf digest.
    pub fn leaf_preimage(&self) -> [u8; LEAF_PREIMAGE_LEN] {
        let mut out = [0u8; LEAF_PREIMAGE_LEN];
        out[..8].copy_from_slice(&self.index.to_le_bytes());
        out[8..40].copy_from_slice(self.recipient.as_bytes());
        out[40..].copy_from_slice(&self.amount.to_le_bytes());
        out
    }
}

/// One line of the allocation source: `{ "account": "<base58>", "amount": 100 }`.
///
/// The amount may be given as a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// Recipient account.
    pub account: AccountId,
    /// Quantity in base units.
    #[serde(deserialize_with = "amount_from_number_or_string")]
    pub amount: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(u64),
    Text(String),
}

fn amount_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => Ok(n),
        RawAmount::Text(s) => parse_amount(&s).map_err(serde::de::Error::custom),
    }
}

/// Parse a base-unit amount from a decimal string.
pub fn parse_amount(s: &str) -> Result<u64, ParseError> {
    s.trim()
        .parse::<u64>()
        .map_err(|e| ParseError::InvalidAmount(format!("{s:?}: {e}")))
}

/// Assign indices by position. Duplicate recipients are kept as separate
/// allocations.
pub fn allocations_from_entries(entries: &[AllocationEntry]) -> Vec<Allocation> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| Allocation::new(i as u64, e.account, e.amount))
        .collect()
}

/// First allocation belonging to `recipient`, or `None` for "no allocation".
pub fn find_by_recipient<'a>(
    allocations: &'a [Allocation],
    recipient: &AccountId,
) -> Option<&'a Allocation> {
    allocations.iter().find(|a| &a.recipient == recipient)
}

/// Render a base-unit amount with `decimals` fractional digits, trimming
/// trailing zeros (`1_500_000_000` with 9 decimals renders as `1.5`).
pub fn format_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u128.pow(u32::from(decimals));
    let whole = u128::from(amount) / scale;
    let frac = u128::from(amount) % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = usize::from(decimals));
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_preimage_layout() {
        let a = Allocation::new(0x0102, AccountId::new([0xEE; 32]), 0x0A0B);
        let p = a.leaf_preimage();
        assert_eq!(p.len(), 48);
        assert_eq!(&p[..8], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&p[8..40], &[0xEE; 32]);
        assert_eq!(&p[40..], &[0x0B, 0x0A, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_entries_accept_number_and_string_amounts() {
        let a = AccountId::new([1; 32]);
        let b = AccountId::new([2; 32]);
        let json = format!(
            r#"[{{"account":"{a}","amount":100}},{{"account":"{b}","amount":"200"}}]"#
        );
        let entries: Vec<AllocationEntry> = serde_json::from_str(&json).unwrap();
        let allocs = allocations_from_entries(&entries);
        assert_eq!(allocs[0], Allocation::new(0, a, 100));
        assert_eq!(allocs[1], Allocation::new(1, b, 200));
    }

    #[test]
    fn test_entries_reject_bad_amount() {
        let a = AccountId::new([1; 32]);
        let json = format!(r#"[{{"account":"{a}","amount":"-5"}}]"#);
        assert!(serde_json::from_str::<Vec<AllocationEntry>>(&json).is_err());
    }

    #[test]
    fn test_duplicates_are_not_deduplicated() {
        let a = AccountId::new([1; 32]);
        let entries = vec![
            AllocationEntry { account: a, amount: 1 },
            AllocationEntry { account: a, amount: 1 },
        ];
        let allocs = allocations_from_entries(&entries);
        assert_eq!(allocs.len(), 2);
        assert_eq!(allocs[1].index, 1);
    }

    #[test]
    fn test_find_by_recipient() {
        let a = AccountId::new([1; 32]);
        let b = AccountId::new([2; 32]);
        let allocs = vec![Allocation::new(0, a, 5), Allocation::new(1, b, 6)];
        assert_eq!(find_by_recipient(&allocs, &b).map(|x| x.index), Some(1));
        assert!(find_by_recipient(&allocs, &AccountId::new([3; 32])).is_none());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000_000, 9), "1.5");
        assert_eq!(format_amount(2_000_000_000, 9), "2");
        assert_eq!(format_amount(1, 9), "0.000000001");
        assert_eq!(format_amount(42, 0), "42");
        assert_eq!(format_amount(u64::MAX, 19), "1.8446744073709551615");
    }
}
