//! Canonical encoding of a [`FactSet`] into the prover input vector.
//!
//! The word order and the address split are a wire contract with the
//! circuit. Changing either on one side only breaks every proof.

use alloy::primitives::U256;

use crate::error::{CertifyError, Result};
use crate::facts::FactSet;
use crate::types::ProverInput;

/// Hex digits in a 160-bit contract address.
pub const ADDRESS_HEX_DIGITS: usize = 40;

/// Splits a contract address into its upper and lower halves.
///
/// The string is cut at `len / 2` and each half is read as a base-16 integer.
/// For the 40-digit addresses accepted here that is an 80/80-bit split, which
/// matches the verifier's pair of `uint128` halves:
///
/// ```text
/// part1 = addr >> 80
/// part2 = addr & ((1 << 80) - 1)
/// ```
///
/// Non-hex characters and odd lengths are [`CertifyError::MalformedAddress`].
/// Any other length is [`CertifyError::UnsupportedAddressLength`]. The input is
/// never padded or truncated.
pub fn split_address(address: &str) -> Result<(U256, U256)> {
    if address.is_empty() {
        return Err(malformed(address, "address is empty"));
    }
    if let Some(bad) = address.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(malformed(address, format!("non-hex character {bad:?}")));
    }
    if address.len() % 2 != 0 {
        return Err(malformed(
            address,
            format!("odd number of hex digits ({})", address.len()),
        ));
    }
    if address.len() != ADDRESS_HEX_DIGITS {
        return Err(CertifyError::UnsupportedAddressLength {
            length: address.len(),
            expected: ADDRESS_HEX_DIGITS,
        });
    }

    let lower = address.to_ascii_lowercase();
    let (upper_half, lower_half) = lower.split_at(ADDRESS_HEX_DIGITS / 2);

    Ok((parse_half(address, upper_half)?, parse_half(address, lower_half)?))
}

/// Encodes a fact set into the 8-word prover input vector.
pub fn encode(facts: &FactSet) -> Result<ProverInput> {
    let (address_part1, address_part2) = split_address(&facts.contract_address)?;

    Ok(ProverInput::new([
        address_part1,
        address_part2,
        U256::from(facts.days_ago_added),
        flag(facts.is_active),
        facts.volume,
        facts.market_cap,
        facts.total_supply,
        flag(facts.has_source_code),
    ]))
}

fn flag(value: bool) -> U256 {
    U256::from(u8::from(value))
}

fn parse_half(address: &str, half: &str) -> Result<U256> {
    u128::from_str_radix(half, 16)
        .map(U256::from)
        .map_err(|e| malformed(address, e.to_string()))
}

fn malformed(address: &str, reason: impl Into<String>) -> CertifyError {
    CertifyError::MalformedAddress {
        address: address.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(address: &str) -> FactSet {
        FactSet {
            contract_address: address.to_string(),
            has_source_code: true,
            total_supply: U256::from(1000u64),
            name: "Lombard Bitcoin".to_string(),
            symbol: "LBTC".to_string(),
            days_ago_added: 10,
            is_active: true,
            volume: U256::from(500u64),
            market_cap: U256::from(2000u64),
        }
    }

    #[test]
    fn encodes_reference_scenario() {
        let input = encode(&facts("0000000000000000000000000000000000000001")).unwrap();

        assert_eq!(
            input.words(),
            &[0u64, 1, 10, 1, 500, 2000, 1000, 1].map(U256::from)
        );
    }

    #[test]
    fn rejects_38_digit_scenario_literal() {
        let err = encode(&facts("00000000000000000000000000000000000001")).unwrap_err();
        assert!(matches!(
            err,
            CertifyError::UnsupportedAddressLength {
                length: 38,
                expected: 40
            }
        ));
    }

    #[test]
    fn split_is_80_80() {
        let (part1, part2) = split_address("8236a87084f8b84306f72007f36f2618a5634494").unwrap();

        let full = U256::from_str_radix("8236a87084f8b84306f72007f36f2618a5634494", 16).unwrap();
        let mask = (U256::from(1u64) << 80) - U256::from(1u64);
        assert_eq!(part1, full >> 80);
        assert_eq!(part2, full & mask);
    }

    #[test]
    fn split_ignores_case() {
        assert_eq!(
            split_address("8236A87084F8B84306F72007F36F2618A5634494").unwrap(),
            split_address("8236a87084f8b84306f72007f36f2618a5634494").unwrap()
        );
    }

    #[test]
    fn rejects_odd_length() {
        let err = split_address("123").unwrap_err();
        assert!(matches!(err, CertifyError::MalformedAddress { .. }));
    }

    #[test]
    fn rejects_even_non_40_lengths() {
        for len in [2usize, 38, 42, 64] {
            let err = split_address(&"a".repeat(len)).unwrap_err();
            assert!(
                matches!(err, CertifyError::UnsupportedAddressLength { length, .. } if length == len),
                "length {len}"
            );
        }
    }

    #[test]
    fn rejects_prefix_and_non_hex() {
        let err = split_address("0x8236a87084f8b84306f72007f36f2618a56344").unwrap_err();
        assert!(matches!(err, CertifyError::MalformedAddress { .. }));

        let err = split_address("g236a87084f8b84306f72007f36f2618a5634494").unwrap_err();
        assert!(matches!(err, CertifyError::MalformedAddress { .. }));

        let err = split_address("").unwrap_err();
        assert!(matches!(err, CertifyError::MalformedAddress { .. }));
    }

    #[test]
    fn encode_is_deterministic_and_ignores_labels() {
        let a = facts("8236a87084f8b84306f72007f36f2618a5634494");
        let mut b = a.clone();
        b.name = "Other".to_string();
        b.symbol = "OTH".to_string();

        assert_eq!(encode(&a).unwrap(), encode(&a).unwrap());
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }

    #[test]
    fn encode_keeps_wide_values() {
        let mut f = facts("8236a87084f8b84306f72007f36f2618a5634494");
        f.total_supply = U256::MAX;
        f.is_active = false;
        f.has_source_code = false;

        let words = *encode(&f).unwrap().words();
        assert_eq!(words[3], U256::ZERO);
        assert_eq!(words[6], U256::MAX);
        assert_eq!(words[7], U256::ZERO);
    }
}
