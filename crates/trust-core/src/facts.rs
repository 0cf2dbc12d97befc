//! Facts gathered about a token contract before scoring.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Snapshot of the public facts gathered about one token contract.
///
/// Built once per run from provider responses and never mutated afterwards.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    /// Contract address as 40 lowercase hex digits, without `0x`.
    pub contract_address: String,
    /// Whether the explorer publishes verified source code.
    pub has_source_code: bool,
    /// ERC-20 total supply in base units.
    pub total_supply: U256,
    /// Token name. Informational, never encoded.
    pub name: String,
    /// Token symbol. Informational, never encoded.
    pub symbol: String,
    /// Whole days since the token was listed.
    pub days_ago_added: u64,
    /// Whether the market-data provider lists the token as active.
    pub is_active: bool,
    /// 24h trading volume.
    pub volume: U256,
    /// Market capitalisation.
    pub market_cap: U256,
}

/// Strips an optional `0x`/`0X` prefix and surrounding whitespace, and lowercases.
///
/// Length and digit checks are left to the encoder so that malformed input is
/// rejected there rather than silently repaired here.
pub fn normalize_address(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    digits.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_address;

    #[test]
    fn normalize_strips_prefix_and_lowercases() {
        assert_eq!(
            normalize_address(" 0x8236A87084F8B84306F72007F36F2618A5634494 "),
            "8236a87084f8b84306f72007f36f2618a5634494"
        );
        assert_eq!(normalize_address("0XABCD"), "abcd");
        assert_eq!(normalize_address("abcd"), "abcd");
    }

    #[test]
    fn normalize_does_not_pad_or_truncate() {
        assert_eq!(normalize_address("0x1"), "1");
        assert_eq!(normalize_address(""), "");
    }
}
