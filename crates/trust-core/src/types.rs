//! Value types passed between the encoder, the prover and the verifier.

use alloy::primitives::U256;
use serde::Serialize;

use crate::crypto::bn254;

/// Number of words in the prover input vector.
pub const PROVER_INPUT_LEN: usize = 8;

/// Number of public inputs the verifier checks.
pub const PUBLIC_INPUT_LEN: usize = 4;

/// Fixed-order numeric encoding of a fact set, as consumed by the prover.
///
/// Layout: `[address_part1, address_part2, days_ago_added, is_active,
/// volume, market_cap, total_supply, has_source_code]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProverInput([U256; PROVER_INPUT_LEN]);

impl ProverInput {
    /// Wraps an already ordered vector.
    pub const fn new(words: [U256; PROVER_INPUT_LEN]) -> Self {
        Self(words)
    }

    /// The words in wire order.
    pub fn words(&self) -> &[U256; PROVER_INPUT_LEN] {
        &self.0
    }

    /// Decimal renderings of the words, one argument per word.
    pub fn witness_args(&self) -> Vec<String> {
        self.0.iter().map(U256::to_string).collect()
    }
}

/// Groth16 proof as emitted by the prover.
///
/// `a` and `c` are G1 points `(x, y)`. `b` is a G2 point in EIP-197 order,
/// `[[x_im, x_re], [y_im, y_re]]`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Proof {
    /// First G1 point.
    pub a: [U256; 2],
    /// G2 point.
    pub b: [[U256; 2]; 2],
    /// Second G1 point.
    pub c: [U256; 2],
}

/// Public inputs of the trust circuit.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PublicInputs {
    /// Witness-derived trust score.
    pub score: U256,
    /// Witness-derived signature over the score.
    pub signature: U256,
    /// Upper half of the contract address.
    pub address_part1: U256,
    /// Lower half of the contract address.
    pub address_part2: U256,
}

impl PublicInputs {
    /// The inputs in verifier order: score, signature, address halves.
    pub fn to_words(&self) -> [U256; PUBLIC_INPUT_LEN] {
        [
            self.score,
            self.signature,
            self.address_part1,
            self.address_part2,
        ]
    }

    /// Score projected onto `[0, 1)`, for reporting only.
    pub fn normalized_score(&self) -> f64 {
        bn254::normalize(&self.score)
    }
}

/// Everything the prover returned for one run.
///
/// The address halves inside `inputs` are claims and must go through
/// [`reconcile`](crate::reconcile::reconcile) before verification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Computation {
    /// Curve name, e.g. `bn128`.
    pub curve: String,
    /// Proving scheme name, e.g. `g16`.
    pub scheme: String,
    /// The proof itself.
    pub proof: Proof,
    /// Public inputs as claimed by the prover.
    pub inputs: PublicInputs,
    /// SHA-256 of the raw proof artifact.
    pub artifact_digest: [u8; 32],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witness_args_are_decimal_and_ordered() {
        let mut words = [U256::ZERO; PROVER_INPUT_LEN];
        words[0] = U256::from(0xffu64);
        words[7] = U256::from(1u64) << 200;

        let args = ProverInput::new(words).witness_args();

        assert_eq!(args.len(), PROVER_INPUT_LEN);
        assert_eq!(args[0], "255");
        assert_eq!(
            args[7],
            "1606938044258990275541962092341162602522202993782792835301376"
        );
    }

    #[test]
    fn public_inputs_keep_verifier_order() {
        let inputs = PublicInputs {
            score: U256::from(1u64),
            signature: U256::from(2u64),
            address_part1: U256::from(3u64),
            address_part2: U256::from(4u64),
        };
        assert_eq!(
            inputs.to_words(),
            [1u64, 2, 3, 4].map(U256::from)
        );
    }
}
